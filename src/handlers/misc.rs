use axum::{
    http::{StatusCode, Uri},
    response::Html,
};

use crate::{infrastructure::middleware::Vc, views};

pub async fn about_author(vc: Vc) -> Html<String> {
    Html(views::misc::about_author(&vc))
}

pub async fn about_tech(vc: Vc) -> Html<String> {
    Html(views::misc::about_tech(&vc))
}

/// Fallback for every unmatched route.
pub async fn not_found(uri: Uri) -> (StatusCode, Html<String>) {
    tracing::debug!("No route for {}", uri.path());
    (StatusCode::NOT_FOUND, Html(views::misc::not_found_page(uri.path())))
}
