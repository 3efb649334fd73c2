// Sample data - authors, groups, posts, comments and follows for a local site

use tracing::info;

use crate::{
    error::AppResult,
    infrastructure::{security::hash_password, BlogDatabase},
    models::{AuthorId, GroupId, PostDraft},
};

/// Password shared by every seeded author.
pub const SAMPLE_PASSWORD: &str = "yatube-sample";

const SAMPLE_AUTHORS: &[(&str, &str)] = &[
    ("leo", "Leo Tolstoy"),
    ("anna", "Anna Akhmatova"),
    ("fyodor", "Fyodor Dostoevsky"),
    ("marina", "Marina Tsvetaeva"),
    ("anton", "Anton Chekhov"),
];

const SAMPLE_GROUPS: &[(&str, &str, &str)] = &[
    ("Prose", "prose", "Stories, novels and everything in between"),
    ("Poetry", "poetry", "Verses old and new"),
    ("Travel notes", "travel", "Roads, trains and the people met on them"),
];

// (author index, group index, text)
const SAMPLE_POSTS: &[(usize, Option<usize>, &str)] = &[
    (0, Some(0), "All happy families are alike; each unhappy family is unhappy in its own way."),
    (0, None, "Started a new chapter today. The battle scenes are taking longer than planned."),
    (1, Some(1), "Sometimes a single line arrives complete, and the rest of the poem follows it home."),
    (2, Some(0), "Pain and suffering are always inevitable for a large intelligence and a deep heart."),
    (2, Some(2), "Wiesbaden again. The roulette tables are a worse companion than any critic."),
    (3, Some(1), "Poems written so early that I did not know I was a poet."),
    (4, Some(2), "Sakhalin notes: the island is cold, the people are warm, the paperwork is endless."),
    (4, None, "Brevity is the sister of talent."),
];

// (follower index, author index)
const SAMPLE_FOLLOWS: &[(usize, usize)] = &[(0, 4), (1, 3), (2, 0), (3, 1), (4, 0), (4, 2)];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub authors: usize,
    pub groups: usize,
    pub posts: usize,
    pub comments: usize,
    pub follows: usize,
}

/// Fill an empty store with a small connected community.
///
/// Existing authors and groups are reused, so running twice only adds posts
/// and comments.
pub async fn seed_sample_data(db: &BlogDatabase) -> AppResult<SeedSummary> {
    let mut summary = SeedSummary::default();
    let password_hash = hash_password(SAMPLE_PASSWORD)?;

    let mut author_ids: Vec<AuthorId> = Vec::with_capacity(SAMPLE_AUTHORS.len());
    for (username, full_name) in SAMPLE_AUTHORS {
        let author = match db.get_author_by_username(username).await? {
            Some(author) => author,
            None => {
                summary.authors += 1;
                db.create_author(username, Some(*full_name), &password_hash).await?
            }
        };
        author_ids.push(author.id);
    }

    let mut group_ids: Vec<GroupId> = Vec::with_capacity(SAMPLE_GROUPS.len());
    for (title, slug, description) in SAMPLE_GROUPS {
        let group = match db.get_group_by_slug(slug).await? {
            Some(group) => group,
            None => {
                summary.groups += 1;
                db.create_group(title, slug, description).await?
            }
        };
        group_ids.push(group.id);
    }

    for (i, (author, group, text)) in SAMPLE_POSTS.iter().enumerate() {
        let draft = PostDraft {
            text: text.to_string(),
            group_id: group.map(|g| group_ids[g]),
            image: None,
        };
        let post_id = db.create_post(author_ids[*author], &draft).await?;
        summary.posts += 1;

        // Each post gets a comment from the next author along.
        let commenter = author_ids[(author + 1 + i % 2) % author_ids.len()];
        db.create_comment(post_id, commenter, "Thank you for sharing this.").await?;
        summary.comments += 1;
    }

    for (follower, author) in SAMPLE_FOLLOWS {
        if db.create_follow(author_ids[*follower], author_ids[*author]).await? {
            summary.follows += 1;
        }
    }

    info!(
        "Seeded {} authors, {} groups, {} posts, {} comments, {} follows",
        summary.authors, summary.groups, summary.posts, summary.comments, summary.follows
    );
    Ok(summary)
}
