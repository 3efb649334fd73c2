use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::debug;

use super::{parse_post_id, PostSubmission};
use crate::{
    app_state::AppState,
    error::AppResult,
    infrastructure::middleware::{AuthorVc, Vc},
    services::{CommentForm, CommentOutcome, CreateOutcome, EditAccess, EditOutcome, FormErrors},
    urls,
    views::{self, posts::PostFormValues},
};

pub async fn new_post_form(State(state): State<AppState>, author: AuthorVc) -> AppResult<Html<String>> {
    let groups = state.post_service.group_choices().await?;
    Ok(Html(views::posts::post_form_page(
        &author,
        None,
        &PostFormValues::default(),
        &groups,
        &FormErrors::new(),
    )))
}

pub async fn create_post(
    State(state): State<AppState>,
    author: AuthorVc,
    submission: PostSubmission,
) -> AppResult<Response> {
    let values = PostFormValues {
        text: submission.form.text.clone(),
        group_id: None,
        group_raw: submission.form.group.clone(),
    };

    match state
        .post_service
        .create_post(&author, submission.form, submission.image)
        .await?
    {
        CreateOutcome::Created(_) => Ok(urls::found(&urls::index())),
        CreateOutcome::Invalid(errors) => {
            let groups = state.post_service.group_choices().await?;
            Ok(Html(views::posts::post_form_page(&author, None, &values, &groups, &errors)).into_response())
        }
    }
}

pub async fn post_view(
    State(state): State<AppState>,
    vc: Vc,
    Path((username, post_id)): Path<(String, String)>,
) -> AppResult<Html<String>> {
    let post_id = parse_post_id(&post_id)?;
    let detail = state.post_service.post_detail(&vc, &username, post_id).await?;
    Ok(Html(views::posts::post_detail_page(&vc, &detail, "", &FormErrors::new())))
}

/// Non-authors are sent back to the post instead of seeing the form.
pub async fn post_edit_form(
    State(state): State<AppState>,
    author: AuthorVc,
    Path((username, post_id)): Path<(String, String)>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    match state.post_service.edit_access(&author, &username, post_id).await? {
        EditAccess::Allowed(post) => {
            let groups = state.post_service.group_choices().await?;
            let values = PostFormValues::from_post(&post);
            Ok(Html(views::posts::post_form_page(
                &author,
                Some(&post),
                &values,
                &groups,
                &FormErrors::new(),
            ))
            .into_response())
        }
        EditAccess::NotAuthor(post) => Ok(urls::found(&urls::post(&post.author_username, post.id))),
    }
}

pub async fn post_edit(
    State(state): State<AppState>,
    author: AuthorVc,
    Path((username, post_id)): Path<(String, String)>,
    submission: PostSubmission,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let values = PostFormValues {
        text: submission.form.text.clone(),
        group_id: None,
        group_raw: Some(submission.form.group.clone().unwrap_or_default()),
    };

    match state
        .post_service
        .edit_post(&author, &username, post_id, submission.form, submission.image)
        .await?
    {
        EditOutcome::Updated(post) | EditOutcome::NotAuthor(post) => {
            Ok(urls::found(&urls::post(&post.author_username, post.id)))
        }
        EditOutcome::Invalid { post, errors } => {
            let groups = state.post_service.group_choices().await?;
            Ok(Html(views::posts::post_form_page(&author, Some(&post), &values, &groups, &errors)).into_response())
        }
    }
}

/// Always lands back on the post; blank comments are simply dropped.
pub async fn add_comment(
    State(state): State<AppState>,
    author: AuthorVc,
    Path((username, post_id)): Path<(String, String)>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let (post, outcome) = state
        .comment_service
        .add_comment(&author, &username, post_id, form)
        .await?;
    if let CommentOutcome::Invalid(errors) = outcome {
        debug!("Comment on post {} rejected: {:?}", post.id, errors);
    }
    Ok(urls::found(&urls::post(&post.author_username, post.id)))
}

/// The comment form lives on the detail page.
pub async fn comment_redirect(
    State(state): State<AppState>,
    _author: AuthorVc,
    Path((username, post_id)): Path<(String, String)>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let post = state.post_service.find_post(&username, post_id).await?;
    Ok(urls::found(&urls::post(&post.author_username, post.id)))
}
