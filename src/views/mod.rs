// HTML views - plain string rendering shared by every page
// Output depends only on its inputs so cached renders stay byte-identical.

pub mod auth;
pub mod feeds;
pub mod misc;
pub mod posts;

use std::fmt::Write;

use crate::{core::Page, infrastructure::ViewerContext, models::Post, services::FormErrors, urls};

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Line breaks in user text become `<br>` after escaping.
pub fn linebreaks(raw: &str) -> String {
    escape_html(raw).replace('\n', "<br>\n")
}

fn nav(vc: &ViewerContext) -> String {
    let mut html = String::from("<nav>\n");
    let _ = writeln!(html, "  <a href=\"{}\">Yatube</a>", urls::index());
    let _ = writeln!(html, "  <a href=\"/about/author/\">About the author</a>");
    let _ = writeln!(html, "  <a href=\"/about/tech/\">Technologies</a>");
    match vc.username() {
        Some(username) => {
            let _ = writeln!(html, "  <a href=\"{}\">New post</a>", urls::new_post());
            let _ = writeln!(html, "  <a href=\"{}\">Following</a>", urls::follow_index());
            let _ = writeln!(
                html,
                "  <a href=\"{}\">{}</a>",
                urls::profile(username),
                escape_html(username)
            );
            let _ = writeln!(html, "  <a href=\"{}\">Log out</a>", urls::LOGOUT);
        }
        None => {
            let _ = writeln!(html, "  <a href=\"{}\">Log in</a>", urls::LOGIN);
            let _ = writeln!(html, "  <a href=\"{}\">Sign up</a>", urls::SIGNUP);
        }
    }
    html.push_str("</nav>\n");
    html
}

/// Full page with the navigation bar for `vc`.
pub fn layout(vc: &ViewerContext, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{nav}<main>\n{body}</main>\n<footer>&copy; Yatube</footer>\n</body>\n</html>\n",
        title = escape_html(title),
        nav = nav(vc),
        body = body,
    )
}

/// One post as it appears in a feed.
pub fn post_card(post: &Post, show_group_link: bool) -> String {
    let mut html = String::from("<article class=\"post\">\n");
    let _ = writeln!(
        html,
        "  <p class=\"post-meta\">Author: <a href=\"{}\">{}</a> &middot; {}</p>",
        urls::profile(&post.author_username),
        escape_html(&post.author_username),
        post.pub_date.format("%d %b %Y")
    );
    if let Some(image) = &post.image {
        let _ = writeln!(html, "  <img class=\"post-image\" src=\"{}\" alt=\"\">", urls::media(image));
    }
    let _ = writeln!(html, "  <p class=\"post-text\">{}</p>", linebreaks(&post.text));
    let _ = writeln!(
        html,
        "  <a class=\"post-link\" href=\"{}\">Details</a>",
        urls::post(&post.author_username, post.id)
    );
    if show_group_link {
        if let (Some(slug), Some(title)) = (&post.group_slug, &post.group_title) {
            let _ = writeln!(
                html,
                "  <a class=\"group-link\" href=\"{}\">All posts of {}</a>",
                urls::group(slug),
                escape_html(title)
            );
        }
    }
    html.push_str("</article>\n");
    html
}

/// Posts of a page followed by its page links.
pub fn post_list(page: &Page<Post>, show_group_link: bool) -> String {
    let mut html = String::new();
    if page.is_empty() {
        html.push_str("<p class=\"empty\">No posts yet.</p>\n");
    }
    for post in page {
        html.push_str(&post_card(post, show_group_link));
    }
    html.push_str(&paginator(page));
    html
}

pub fn paginator<T>(page: &Page<T>) -> String {
    if !page.has_other_pages() {
        return String::new();
    }
    let mut html = String::from("<nav class=\"pagination\">\n");
    if let Some(previous) = page.previous_page_number() {
        let _ = writeln!(html, "  <a href=\"?page=1\">First</a>");
        let _ = writeln!(html, "  <a href=\"?page={}\">Previous</a>", previous);
    }
    let _ = writeln!(
        html,
        "  <span class=\"current\">Page {} of {}</span>",
        page.number, page.num_pages
    );
    if let Some(next) = page.next_page_number() {
        let _ = writeln!(html, "  <a href=\"?page={}\">Next</a>", next);
        let _ = writeln!(html, "  <a href=\"?page={}\">Last</a>", page.num_pages);
    }
    html.push_str("</nav>\n");
    html
}

/// Error list for one form field, empty when the field is valid.
pub fn field_errors(errors: &FormErrors, field: &str) -> String {
    let messages = errors.get(field);
    if messages.is_empty() {
        return String::new();
    }
    let mut html = String::from("<ul class=\"errorlist\">");
    for message in messages {
        let _ = write!(html, "<li>{}</li>", escape_html(message));
    }
    html.push_str("</ul>\n");
    html
}
