// Static pages and error pages

use axum::http::StatusCode;

use super::{escape_html, layout};
use crate::{infrastructure::ViewerContext, urls};

/// Minimal page used where no viewer is at hand, such as error responses.
fn bare_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<main>\n{}</main>\n<p><a href=\"{}\">Back to the home page</a></p>\n</body>\n</html>\n",
        escape_html(title),
        body,
        urls::index()
    )
}

/// 404 page naming what was not found.
pub fn not_found_page(path: &str) -> String {
    let body = format!(
        "<h1>Page not found</h1>\n<p>Nothing lives at <code>{}</code>.</p>\n",
        escape_html(path)
    );
    bare_page("Page not found", &body)
}

pub fn server_error_page() -> String {
    bare_page(
        "Server error",
        "<h1>Server error</h1>\n<p>Something went wrong on our side.</p>\n",
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!("<h1>{}</h1>\n<p>{}</p>\n", escape_html(title), escape_html(message));
    bare_page(title, &body)
}

pub fn about_author(vc: &ViewerContext) -> String {
    layout(
        vc,
        "About the author",
        "<h1>About the author</h1>\n<p>Yatube is a small blogging platform written as a study project.</p>\n",
    )
}

pub fn about_tech(vc: &ViewerContext) -> String {
    layout(
        vc,
        "Technologies",
        "<h1>Technologies</h1>\n<ul>\n  <li>Rust and Tokio</li>\n  <li>axum and tower-http</li>\n  <li>SQLite through sqlx</li>\n</ul>\n",
    )
}
