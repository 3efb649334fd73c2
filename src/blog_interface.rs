// Blog interface - the HTML routes of the site

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    app_state::AppState,
    handlers::{auth, feeds, follows, misc, posts},
    infrastructure::middleware::viewer_context_middleware,
};

/// Largest accepted request body; bounds image uploads.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn create_blog_router(state: AppState) -> Router {
    let media = ServeDir::new(state.media.root());

    Router::new()
        // Feeds
        .route("/", get(feeds::index))
        .route("/group/{slug}/", get(feeds::group_posts))
        .route("/follow/", get(feeds::follow_index))

        // Accounts
        .route("/auth/signup/", get(auth::signup_form).post(auth::signup))
        .route("/auth/login/", get(auth::login_form).post(auth::login))
        .route("/auth/logout/", get(auth::logout))

        // Static pages
        .route("/about/author/", get(misc::about_author))
        .route("/about/tech/", get(misc::about_tech))

        // Posts
        .route("/new/", get(posts::new_post_form).post(posts::create_post))
        .route("/{username}/{post_id}/", get(posts::post_view))
        .route("/{username}/{post_id}/edit/", get(posts::post_edit_form).post(posts::post_edit))
        .route(
            "/{username}/{post_id}/comment/",
            get(posts::comment_redirect).post(posts::add_comment),
        )

        // Profiles and follows
        .route("/{username}/", get(feeds::profile))
        .route("/{username}/follow/", get(follows::profile_follow))
        .route("/{username}/unfollow/", get(follows::profile_unfollow))

        .fallback(misc::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), viewer_context_middleware))
        .nest_service("/media", media)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
