use std::fmt::Write;

use super::{escape_html, field_errors, layout, linebreaks};
use crate::{
    infrastructure::ViewerContext,
    models::{Group, GroupId, Post},
    services::{FormErrors, PostDetail},
    urls,
};

/// Values shown in a post form; empty for a new post.
#[derive(Debug, Clone, Default)]
pub struct PostFormValues {
    pub text: String,
    pub group_id: Option<GroupId>,
    pub group_raw: Option<String>,
}

impl PostFormValues {
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group_id: post.group_id,
            group_raw: None,
        }
    }

    fn selected(&self, group: &Group) -> bool {
        match &self.group_raw {
            Some(raw) => raw.trim() == group.id.to_string(),
            None => self.group_id == Some(group.id),
        }
    }
}

/// Create form when `editing` is `None`, edit form otherwise.
pub fn post_form_page(
    vc: &ViewerContext,
    editing: Option<&Post>,
    values: &PostFormValues,
    groups: &[Group],
    errors: &FormErrors,
) -> String {
    let (heading, action, button) = match editing {
        Some(post) => ("Edit post", urls::post_edit(&post.author_username, post.id), "Save"),
        None => ("New post", urls::new_post(), "Publish"),
    };

    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", heading);
    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"{}\" enctype=\"multipart/form-data\">",
        action
    );
    body.push_str(&field_errors(errors, "text"));
    let _ = writeln!(
        body,
        "  <label for=\"id_text\">Text</label>\n  <textarea name=\"text\" id=\"id_text\" required>{}</textarea>",
        escape_html(&values.text)
    );

    body.push_str(&field_errors(errors, "group"));
    body.push_str("  <label for=\"id_group\">Group</label>\n  <select name=\"group\" id=\"id_group\">\n");
    body.push_str("    <option value=\"\">---------</option>\n");
    for group in groups {
        let _ = writeln!(
            body,
            "    <option value=\"{}\"{}>{}</option>",
            group.id,
            if values.selected(group) { " selected" } else { "" },
            escape_html(&group.title)
        );
    }
    body.push_str("  </select>\n");

    body.push_str(&field_errors(errors, "image"));
    if let Some(image) = editing.and_then(|post| post.image.as_deref()) {
        let _ = writeln!(
            body,
            "  <p>Currently: <a href=\"{}\">{}</a></p>",
            urls::media(image),
            escape_html(image)
        );
    }
    body.push_str("  <label for=\"id_image\">Image</label>\n  <input type=\"file\" name=\"image\" id=\"id_image\" accept=\"image/*\">\n");
    let _ = writeln!(body, "  <button type=\"submit\">{}</button>\n</form>", button);

    layout(vc, heading, &body)
}

pub fn comment_form(post: &Post, text: &str, errors: &FormErrors) -> String {
    format!(
        "<form method=\"post\" action=\"{}\" class=\"comment-form\">\n{}  <label for=\"id_comment\">Add a comment</label>\n  <textarea name=\"text\" id=\"id_comment\" required>{}</textarea>\n  <button type=\"submit\">Send</button>\n</form>\n",
        urls::add_comment(&post.author_username, post.id),
        field_errors(errors, "text"),
        escape_html(text)
    )
}

pub fn post_detail_page(vc: &ViewerContext, detail: &PostDetail, comment_text: &str, errors: &FormErrors) -> String {
    let post = &detail.post;
    let mut body = String::from("<article class=\"post-detail\">\n");
    let _ = writeln!(
        body,
        "  <p class=\"post-meta\">Author: <a href=\"{}\">{}</a> &middot; {} &middot; Posts by author: {}</p>",
        urls::profile(&post.author_username),
        escape_html(&post.author_username),
        post.pub_date.format("%d %b %Y %H:%M"),
        detail.author_posts_count
    );
    if let (Some(slug), Some(title)) = (&post.group_slug, &post.group_title) {
        let _ = writeln!(
            body,
            "  <p class=\"post-group\">Group: <a href=\"{}\">{}</a></p>",
            urls::group(slug),
            escape_html(title)
        );
    }
    if let Some(image) = &post.image {
        let _ = writeln!(body, "  <img class=\"post-image\" src=\"{}\" alt=\"\">", urls::media(image));
    }
    let _ = writeln!(body, "  <p class=\"post-text\">{}</p>", linebreaks(&post.text));
    if vc.is_author(post.author_id) {
        let _ = writeln!(
            body,
            "  <a class=\"edit-link\" href=\"{}\">Edit</a>",
            urls::post_edit(&post.author_username, post.id)
        );
    }
    body.push_str("</article>\n");

    if vc.is_authenticated() {
        body.push_str(&comment_form(post, comment_text, errors));
    }

    body.push_str("<section class=\"comments\">\n");
    for comment in &detail.comments {
        let _ = writeln!(
            body,
            "  <div class=\"comment\"><a href=\"{}\">{}</a> <span>{}</span>\n    <p>{}</p>\n  </div>",
            urls::profile(&comment.author_username),
            escape_html(&comment.author_username),
            comment.created.format("%d %b %Y %H:%M"),
            linebreaks(&comment.text)
        );
    }
    body.push_str("</section>\n");

    layout(vc, &post.to_string(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn groups() -> Vec<Group> {
        vec![
            Group {
                id: 1,
                title: "Cats".to_string(),
                slug: "cats".to_string(),
                description: String::new(),
            },
            Group {
                id: 2,
                title: "Dogs".to_string(),
                slug: "dogs".to_string(),
                description: String::new(),
            },
        ]
    }

    #[test]
    fn test_edit_form_is_prefilled() {
        let post = Post {
            id: 9,
            text: "old text".to_string(),
            pub_date: Utc::now(),
            author_id: 1,
            author_username: "leo".to_string(),
            group_id: Some(2),
            group_slug: Some("dogs".to_string()),
            group_title: Some("Dogs".to_string()),
            image: None,
        };
        let vc = ViewerContext::authenticated_user(1, "leo".to_string(), "r".to_string());
        let html = post_form_page(&vc, Some(&post), &PostFormValues::from_post(&post), &groups(), &FormErrors::new());
        assert!(html.contains("action=\"/leo/9/edit/\""));
        assert!(html.contains(">old text</textarea>"));
        assert!(html.contains("<option value=\"2\" selected>Dogs</option>"));
        assert!(html.contains("<option value=\"1\">Cats</option>"));
    }

    #[test]
    fn test_new_form_shows_errors() {
        let vc = ViewerContext::authenticated_user(1, "leo".to_string(), "r".to_string());
        let mut errors = FormErrors::new();
        errors.add("text", "This field is required.");
        let html = post_form_page(&vc, None, &PostFormValues::default(), &groups(), &errors);
        assert!(html.contains("action=\"/new/\""));
        assert!(html.contains("<li>This field is required.</li>"));
    }
}
