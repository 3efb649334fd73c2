use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::{app_state::AppState, error::AppResult, infrastructure::middleware::AuthorVc, urls};

pub async fn profile_follow(
    State(state): State<AppState>,
    author: AuthorVc,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.follow(&author, &username).await?;
    Ok(urls::found(&urls::follow_index()))
}

pub async fn profile_unfollow(
    State(state): State<AppState>,
    author: AuthorVc,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.unfollow(&author, &username).await?;
    Ok(urls::found(&urls::follow_index()))
}
