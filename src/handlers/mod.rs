// HTTP handlers - thin adapters from requests to services and views

pub mod auth;
pub mod feeds;
pub mod follows;
pub mod misc;
pub mod posts;

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::{error::AppError, infrastructure::UploadedImage, models::PostId, services::PostForm};

/// `?page=` as sent by the browser; parsed leniently by the paginator.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

/// Post ids that are not numbers never match a post.
pub fn parse_post_id(raw: &str) -> Result<PostId, AppError> {
    raw.parse::<PostId>()
        .map_err(|_| AppError::NotFound(format!("No post with id {}", raw)))
}

/// A post form sent either as multipart (with an optional image) or urlencoded.
#[derive(Debug, Default)]
pub struct PostSubmission {
    pub form: PostForm,
    pub image: Option<UploadedImage>,
}

impl<S> FromRequest<S> for PostSubmission
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<PostForm>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self { form, image: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let mut submission = PostSubmission::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => submission.form.text = field.text().await.map_err(bad_upload)?,
                "group" => submission.form.group = Some(field.text().await.map_err(bad_upload)?),
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(bad_upload)?;
                    if !file_name.is_empty() && !bytes.is_empty() {
                        submission.image = Some(UploadedImage {
                            file_name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(submission)
    }
}

fn bad_upload(err: axum::extract::multipart::MultipartError) -> Response {
    tracing::warn!("Malformed multipart body: {}", err);
    (StatusCode::BAD_REQUEST, err.body_text()).into_response()
}
