// Feed composer - paginated post listings and the cached home feed

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    core::{Page, Paginator},
    ent_framework::{can_view, PrivacyTarget},
    error::{AppError, AppResult},
    infrastructure::{BlogDatabase, PageCache, ViewerContext},
    models::{Author, Group, Post, PostScope},
};

/// Key prefix for rendered home feed pages.
pub const INDEX_PAGE_KEY: &str = "index_page";

/// An author's page of posts together with their follow stats.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: Author,
    pub page: Page<Post>,
    pub following: u64,
    pub followers: u64,
    pub posts_count: u64,
    /// Whether the viewer already follows this author.
    pub viewer_follows: bool,
}

#[derive(Clone)]
pub struct FeedService {
    db: BlogDatabase,
    paginator: Paginator,
    cache: Arc<dyn PageCache>,
    ttl: Duration,
}

impl FeedService {
    pub fn new(db: BlogDatabase, paginator: Paginator, cache: Arc<dyn PageCache>, ttl: Duration) -> Self {
        Self {
            db,
            paginator,
            cache,
            ttl,
        }
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    async fn page(&self, scope: PostScope, requested: Option<&str>) -> AppResult<Page<Post>> {
        let total = self.db.count_posts(scope).await?;
        let window = self.paginator.window(total, requested);
        let items = self.db.list_posts(scope, window.limit, window.offset).await?;
        Ok(Page::new(items, window, total, self.paginator.per_page()))
    }

    #[instrument(skip(self))]
    pub async fn home_feed(&self, requested: Option<&str>) -> AppResult<Page<Post>> {
        self.page(PostScope::All, requested).await
    }

    /// Home feed rendered through `render`, reusing a cached render while it is fresh.
    ///
    /// New posts do not invalidate the entry; they appear once the TTL lapses
    /// or the cache is cleared.
    pub async fn cached_home_feed<F>(
        &self,
        vc: &ViewerContext,
        path_and_query: &str,
        requested: Option<&str>,
        render: F,
    ) -> AppResult<String>
    where
        F: FnOnce(&Page<Post>) -> String,
    {
        let key = home_cache_key(vc, path_and_query);
        if let Some(html) = self.cache.get(&key).await {
            debug!("Home feed cache hit for {}", key);
            return Ok(html);
        }

        let page = self.home_feed(requested).await?;
        let html = render(&page);
        self.cache.set(&key, html.clone(), self.ttl).await;
        debug!("Home feed cached under {} for {:?}", key, self.ttl);
        Ok(html)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    #[instrument(skip(self))]
    pub async fn group_feed(&self, slug: &str, requested: Option<&str>) -> AppResult<(Group, Page<Post>)> {
        let group = self
            .db
            .get_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", slug)))?;
        let page = self.page(PostScope::Group(group.id), requested).await?;
        Ok((group, page))
    }

    #[instrument(skip(self, vc))]
    pub async fn profile_feed(
        &self,
        vc: &ViewerContext,
        username: &str,
        requested: Option<&str>,
    ) -> AppResult<ProfileFeed> {
        let author = self
            .db
            .get_author_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", username)))?;

        let page = self.page(PostScope::Author(author.id), requested).await?;
        let following = self.db.count_following(author.id).await?;
        let followers = self.db.count_followers(author.id).await?;
        let viewer_follows = match vc.author_id() {
            Some(viewer_id) if viewer_id != author.id => self.db.follow_exists(viewer_id, author.id).await?,
            _ => false,
        };

        Ok(ProfileFeed {
            posts_count: page.total_count,
            author,
            page,
            following,
            followers,
            viewer_follows,
        })
    }

    /// Posts by every author the viewer follows.
    #[instrument(skip(self, vc))]
    pub async fn following_feed(&self, vc: &ViewerContext, requested: Option<&str>) -> AppResult<Page<Post>> {
        let viewer_id = vc
            .author_id()
            .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))?;
        if !can_view(vc, PrivacyTarget::Feed) {
            return Err(AppError::Forbidden("Feed is not visible".to_string()));
        }
        self.page(PostScope::FollowedBy(viewer_id), requested).await
    }
}

pub fn home_cache_key(vc: &ViewerContext, path_and_query: &str) -> String {
    format!("{}:{}:{}", INDEX_PAGE_KEY, path_and_query, vc.cache_identity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::TtlCache;
    use crate::models::PostDraft;

    async fn setup(per_page: u32) -> (BlogDatabase, FeedService) {
        let db = BlogDatabase::new_in_memory().await.unwrap();
        let service = FeedService::new(
            db.clone(),
            Paginator::new(per_page),
            Arc::new(TtlCache::new(16)),
            Duration::from_secs(60),
        );
        (db, service)
    }

    fn draft(text: &str, group_id: Option<i64>) -> PostDraft {
        PostDraft {
            text: text.to_string(),
            group_id,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let (_db, feeds) = setup(10).await;
        let result = feeds.group_feed("missing", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_group_feed_only_lists_group_posts() {
        let (db, feeds) = setup(10).await;
        let author = db.create_author("leo", None, "hash").await.unwrap();
        let cats = db.create_group("Cats", "cats", "").await.unwrap();
        db.create_post(author.id, &draft("cat post", Some(cats.id))).await.unwrap();
        db.create_post(author.id, &draft("plain post", None)).await.unwrap();

        let (group, page) = feeds.group_feed("cats", None).await.unwrap();
        assert_eq!(group.slug, "cats");
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].text, "cat post");
    }

    #[tokio::test]
    async fn test_profile_stats() {
        let (db, feeds) = setup(10).await;
        let leo = db.create_author("leo", None, "hash").await.unwrap();
        let anna = db.create_author("anna", None, "hash").await.unwrap();
        db.create_post(leo.id, &draft("one", None)).await.unwrap();
        db.create_post(leo.id, &draft("two", None)).await.unwrap();
        db.create_follow(anna.id, leo.id).await.unwrap();

        let vc = ViewerContext::for_author(&anna, "req".to_string());
        let profile = feeds.profile_feed(&vc, "leo", None).await.unwrap();
        assert_eq!(profile.posts_count, 2);
        assert_eq!(profile.followers, 1);
        assert_eq!(profile.following, 0);
        assert!(profile.viewer_follows);

        let anon = ViewerContext::anonymous("req".to_string());
        assert!(!feeds.profile_feed(&anon, "leo", None).await.unwrap().viewer_follows);
    }

    #[tokio::test]
    async fn test_following_feed_requires_login() {
        let (_db, feeds) = setup(10).await;
        let anon = ViewerContext::anonymous("req".to_string());
        assert!(matches!(
            feeds.following_feed(&anon, None).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_cached_home_feed_serves_stale_render_until_cleared() {
        let (db, feeds) = setup(10).await;
        let author = db.create_author("leo", None, "hash").await.unwrap();
        let vc = ViewerContext::anonymous("req".to_string());
        let render = |page: &Page<Post>| format!("{} posts", page.total_count);

        let first = feeds.cached_home_feed(&vc, "/", None, render).await.unwrap();
        assert_eq!(first, "0 posts");

        db.create_post(author.id, &draft("fresh", None)).await.unwrap();
        let stale = feeds.cached_home_feed(&vc, "/", None, render).await.unwrap();
        assert_eq!(stale, "0 posts");

        feeds.clear_cache().await;
        let fresh = feeds.cached_home_feed(&vc, "/", None, render).await.unwrap();
        assert_eq!(fresh, "1 posts");
    }

    #[test]
    fn test_cache_key_varies_by_viewer() {
        let anon = ViewerContext::anonymous("a".to_string());
        let leo = ViewerContext::authenticated_user(3, "leo".to_string(), "b".to_string());
        assert_eq!(home_cache_key(&anon, "/?page=2"), "index_page:/?page=2:anonymous");
        assert_eq!(home_cache_key(&leo, "/"), "index_page:/:author:3");
    }
}
