use tracing::{debug, info, instrument};

use crate::{
    ent_framework::can_create,
    error::{AppError, AppResult},
    infrastructure::{BlogDatabase, ViewerContext},
    models::{Comment, Post, PostId},
    services::forms::{CommentForm, FormErrors},
};

#[derive(Debug)]
pub enum CommentOutcome {
    Created(Comment),
    Invalid(FormErrors),
}

#[derive(Clone)]
pub struct CommentService {
    db: BlogDatabase,
}

impl CommentService {
    pub fn new(db: BlogDatabase) -> Self {
        Self { db }
    }

    /// Attach a comment by the viewer to the post `post_id` of `username`.
    ///
    /// Blank text is reported back and nothing is stored.
    #[instrument(skip(self, vc, form))]
    pub async fn add_comment(
        &self,
        vc: &ViewerContext,
        username: &str,
        post_id: PostId,
        form: CommentForm,
    ) -> AppResult<(Post, CommentOutcome)> {
        let author_id = match vc.author_id() {
            Some(id) if can_create(vc) => id,
            _ => return Err(AppError::Unauthorized("Login required to comment".to_string())),
        };
        let post = self
            .db
            .get_post_for_author(username, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} by {} not found", post_id, username)))?;

        let form = form.normalized();
        let errors = form.field_errors();
        if !errors.is_empty() {
            debug!("Rejected blank comment on post {}", post.id);
            return Ok((post, CommentOutcome::Invalid(errors)));
        }

        let comment = self.db.create_comment(post.id, author_id, &form.text).await?;
        info!("Author {} commented on post {}", author_id, post.id);
        Ok((post, CommentOutcome::Created(comment)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostDraft;

    async fn setup() -> (BlogDatabase, CommentService, PostId) {
        let db = BlogDatabase::new_in_memory().await.unwrap();
        let leo = db.create_author("leo", None, "hash").await.unwrap();
        let post_id = db
            .create_post(
                leo.id,
                &PostDraft {
                    text: "hello".to_string(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();
        (db.clone(), CommentService::new(db), post_id)
    }

    fn text(value: &str) -> CommentForm {
        CommentForm {
            text: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_comment_is_stored_with_viewer_as_author() {
        let (db, comments, post_id) = setup().await;
        let anna = db.create_author("anna", None, "hash").await.unwrap();
        let vc = ViewerContext::for_author(&anna, "req".to_string());

        let (_, outcome) = comments.add_comment(&vc, "leo", post_id, text(" nice ")).await.unwrap();
        let CommentOutcome::Created(comment) = outcome else {
            panic!("expected a comment");
        };
        assert_eq!(comment.text, "nice");
        assert_eq!(comment.author_username, "anna");
        assert_eq!(db.count_comments(post_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_and_blank_comments_are_not_stored() {
        let (db, comments, post_id) = setup().await;
        let anon = ViewerContext::anonymous("req".to_string());
        assert!(matches!(
            comments.add_comment(&anon, "leo", post_id, text("hi")).await,
            Err(AppError::Unauthorized(_))
        ));

        let leo = db.get_author_by_username("leo").await.unwrap().unwrap();
        let vc = ViewerContext::for_author(&leo, "req".to_string());
        let (_, outcome) = comments.add_comment(&vc, "leo", post_id, text("   ")).await.unwrap();
        assert!(matches!(outcome, CommentOutcome::Invalid(_)));
        assert_eq!(db.count_comments(post_id).await.unwrap(), 0);
    }
}
