// ViewerContext Middleware - resolves the session cookie into a request-scoped viewer
// Handlers only ever see the ViewerContext, never the cookie

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    error::AppResult,
    infrastructure::{database::BlogDatabase, security::SESSION_COOKIE, viewer::ViewerContext},
};

pub async fn viewer_context_middleware(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());
    let viewer_context = create_viewer_context(&app_state.db, token.as_deref()).await?;

    request.extensions_mut().insert(viewer_context);

    Ok(next.run(request).await)
}

/// An unknown or missing token yields an anonymous viewer.
pub async fn create_viewer_context(
    db: &BlogDatabase,
    session_token: Option<&str>,
) -> AppResult<Arc<ViewerContext>> {
    let request_id = format!("req-{}", Uuid::new_v4());

    let viewer_context = match session_token {
        Some(token) => match db.author_for_session(token).await? {
            Some(author) => ViewerContext::for_author(&author, request_id),
            None => {
                debug!("Unknown session token, treating request as anonymous");
                ViewerContext::anonymous(request_id)
            }
        },
        None => ViewerContext::anonymous(request_id),
    };

    Ok(Arc::new(viewer_context))
}
