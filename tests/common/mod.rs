#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use yatube::{
    app_state::AppState,
    blog_interface::create_blog_router,
    config::Config,
    infrastructure::{security::new_session_token, BlogDatabase, TtlCache},
    models::{Author, PostDraft, PostId},
};

pub const BOUNDARY: &str = "yatube-test-boundary";

pub const SMALL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x00\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

/// Full router over an in-memory store and a throwaway media root.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub media: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_per_page(10).await
    }

    pub async fn with_per_page(per_page: u32) -> Self {
        let media = tempfile::tempdir().unwrap();
        let mut config = Config::in_memory(media.path());
        config.feed.per_page = per_page;

        let db = BlogDatabase::new_in_memory().await.unwrap();
        let cache = Arc::new(TtlCache::new(config.cache.capacity));
        let state = AppState::from_parts(config, db, cache).await.unwrap();
        let router = create_blog_router(state.clone());
        Self { state, router, media }
    }

    pub fn db(&self) -> &BlogDatabase {
        &self.state.db
    }

    /// An author with a live session; returns the session token.
    pub async fn author(&self, username: &str) -> (Author, String) {
        let author = self.db().create_author(username, None, "!unusable").await.unwrap();
        let token = new_session_token();
        self.db().create_session(&token, author.id).await.unwrap();
        (author, token)
    }

    pub async fn post(&self, author: &Author, text: &str, group_id: Option<i64>) -> PostId {
        let draft = PostDraft {
            text: text.to_string(),
            group_id,
            image: None,
        };
        self.db().create_post(author.id, &draft).await.unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("sessionid={}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, path: &str, body: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("sessionid={}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn post_multipart(&self, path: &str, body: Vec<u8>, token: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("sessionid={}", token));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

/// Multipart body with text fields and an optional `image` file.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/gif\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::FOUND);
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// Number of post cards rendered in a feed page.
pub fn card_count(html: &str) -> usize {
    html.matches("<article class=\"post\">").count()
}
