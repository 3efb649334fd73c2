// ViewerContext Extractors - typed access to the request viewer for handlers
// `Vc` accepts anyone; `AuthorVc` sends anonymous viewers to the login page

use std::sync::Arc;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::viewer::ViewerContext,
    models::AuthorId,
    urls,
};

/// Cheaply clonable handle to the request's [`ViewerContext`].
///
/// Derefs to `ViewerContext`, so `vc.author_id()` and friends work directly.
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

impl Vc {
    pub fn new(vc: Arc<ViewerContext>) -> Self {
        Self(vc)
    }

    pub fn arc(self) -> Arc<ViewerContext> {
        self.0
    }
}

impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<ViewerContext> for Vc {
    fn as_ref(&self) -> &ViewerContext {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .map(|vc| Vc(vc.clone()))
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Viewer guaranteed to be a logged-in author.
///
/// Rejects anonymous requests with a redirect to the login page whose `next`
/// parameter is the original path and query.
#[derive(Debug, Clone)]
pub struct AuthorVc {
    pub vc: Vc,
    pub author_id: AuthorId,
    pub username: String,
}

impl std::ops::Deref for AuthorVc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.vc
    }
}

impl<S> FromRequestParts<S> for AuthorVc
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let vc = Vc::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match (vc.author_id(), vc.username().map(str::to_string)) {
            (Some(author_id), Some(username)) => Ok(AuthorVc {
                vc,
                author_id,
                username,
            }),
            _ => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or_else(|| parts.uri.path());
                Err(urls::found(&urls::login_with_next(next)))
            }
        }
    }
}
