use std::fmt::Write;

use super::{escape_html, layout, linebreaks, post_list};
use crate::{
    core::Page,
    infrastructure::ViewerContext,
    models::{Group, Post},
    services::ProfileFeed,
    urls,
};

pub fn index_page(vc: &ViewerContext, page: &Page<Post>) -> String {
    let body = format!("<h1>Latest posts</h1>\n{}", post_list(page, true));
    layout(vc, "Yatube home", &body)
}

pub fn group_page(vc: &ViewerContext, group: &Group, page: &Page<Post>) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p class=\"group-description\">{}</p>\n{}",
        escape_html(&group.title),
        linebreaks(&group.description),
        post_list(page, false)
    );
    layout(vc, &format!("Posts of {}", group), &body)
}

pub fn follow_page(vc: &ViewerContext, page: &Page<Post>) -> String {
    let body = format!("<h1>Authors you follow</h1>\n{}", post_list(page, true));
    layout(vc, "Following", &body)
}

pub fn profile_page(vc: &ViewerContext, profile: &ProfileFeed) -> String {
    let author = &profile.author;
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(author.display_name()));
    let _ = writeln!(body, "<p class=\"username\">@{}</p>", escape_html(&author.username));
    let _ = writeln!(
        body,
        "<ul class=\"profile-stats\">\n  <li>Followers: {}</li>\n  <li>Following: {}</li>\n  <li>Posts: {}</li>\n</ul>",
        profile.followers, profile.following, profile.posts_count
    );

    if vc.is_authenticated() && !vc.is_author(author.id) {
        if profile.viewer_follows {
            let _ = writeln!(
                body,
                "<a class=\"unfollow\" href=\"{}\">Unfollow</a>",
                urls::profile_unfollow(&author.username)
            );
        } else {
            let _ = writeln!(
                body,
                "<a class=\"follow\" href=\"{}\">Follow</a>",
                urls::profile_follow(&author.username)
            );
        }
    }

    body.push_str(&post_list(&profile.page, true));
    layout(vc, &format!("Profile of {}", author.display_name()), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Paginator;
    use crate::models::Author;
    use chrono::Utc;

    fn profile(viewer_follows: bool) -> ProfileFeed {
        let paginator = Paginator::new(10);
        ProfileFeed {
            author: Author {
                id: 2,
                username: "leo".to_string(),
                full_name: Some("Leo Tolstoy".to_string()),
                created_at: Utc::now(),
            },
            page: Page::new(Vec::new(), paginator.window(0, None), 0, 10),
            following: 3,
            followers: 5,
            posts_count: 0,
            viewer_follows,
        }
    }

    #[test]
    fn test_profile_follow_links() {
        let anna = ViewerContext::authenticated_user(1, "anna".to_string(), "r".to_string());
        assert!(profile_page(&anna, &profile(false)).contains("/leo/follow/"));
        assert!(profile_page(&anna, &profile(true)).contains("/leo/unfollow/"));

        let leo = ViewerContext::authenticated_user(2, "leo".to_string(), "r".to_string());
        let own = profile_page(&leo, &profile(false));
        assert!(!own.contains("/leo/follow/"));
        assert!(own.contains("Followers: 5"));
    }
}
