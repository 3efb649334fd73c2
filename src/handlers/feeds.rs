use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::Html,
};

use super::PageQuery;
use crate::{
    app_state::AppState,
    error::AppResult,
    infrastructure::middleware::{AuthorVc, Vc},
    views,
};

/// Home feed, served from the page cache while a render is fresh.
pub async fn index(
    State(state): State<AppState>,
    vc: Vc,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let html = state
        .feed_service
        .cached_home_feed(&vc, path_and_query, query.page(), |page| {
            views::feeds::index_page(&vc, page)
        })
        .await?;
    Ok(Html(html))
}

pub async fn group_posts(
    State(state): State<AppState>,
    vc: Vc,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let (group, page) = state.feed_service.group_feed(&slug, query.page()).await?;
    Ok(Html(views::feeds::group_page(&vc, &group, &page)))
}

pub async fn profile(
    State(state): State<AppState>,
    vc: Vc,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let profile = state.feed_service.profile_feed(&vc, &username, query.page()).await?;
    Ok(Html(views::feeds::profile_page(&vc, &profile)))
}

pub async fn follow_index(
    State(state): State<AppState>,
    author: AuthorVc,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let page = state.feed_service.following_feed(&author, query.page()).await?;
    Ok(Html(views::feeds::follow_page(&author, &page)))
}
