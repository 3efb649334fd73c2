// URL builders for every named route, plus the 302 redirect used throughout

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::models::PostId;

pub const LOGIN: &str = "/auth/login/";
pub const LOGOUT: &str = "/auth/logout/";
pub const SIGNUP: &str = "/auth/signup/";

pub fn index() -> String {
    "/".to_string()
}

pub fn new_post() -> String {
    "/new/".to_string()
}

pub fn follow_index() -> String {
    "/follow/".to_string()
}

pub fn group(slug: &str) -> String {
    format!("/group/{}/", urlencoding::encode(slug))
}

pub fn profile(username: &str) -> String {
    format!("/{}/", urlencoding::encode(username))
}

pub fn post(username: &str, post_id: PostId) -> String {
    format!("/{}/{}/", urlencoding::encode(username), post_id)
}

pub fn post_edit(username: &str, post_id: PostId) -> String {
    format!("/{}/{}/edit/", urlencoding::encode(username), post_id)
}

pub fn add_comment(username: &str, post_id: PostId) -> String {
    format!("/{}/{}/comment/", urlencoding::encode(username), post_id)
}

pub fn profile_follow(username: &str) -> String {
    format!("/{}/follow/", urlencoding::encode(username))
}

pub fn profile_unfollow(username: &str) -> String {
    format!("/{}/unfollow/", urlencoding::encode(username))
}

pub fn media(relative: &str) -> String {
    format!("/media/{}", relative)
}

/// Login page that returns to `next` afterwards. Slashes stay readable.
pub fn login_with_next(next: &str) -> String {
    format!("{}?next={}", LOGIN, urlencoding::encode(next).replace("%2F", "/"))
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
