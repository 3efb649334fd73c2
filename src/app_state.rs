use std::path::Path;
use std::sync::Arc;

use crate::{
    config::Config,
    core::Paginator,
    infrastructure::{BlogDatabase, MediaStorage, PageCache, TtlCache},
    services::{AccountService, CommentService, FeedService, FollowService, PostService},
};

#[derive(Clone)]
pub struct AppState {
    pub db: BlogDatabase,
    pub feed_cache: Arc<dyn PageCache>,
    pub media: MediaStorage,
    pub config: Config,
    pub feed_service: FeedService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub follow_service: FollowService,
    pub account_service: AccountService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        ensure_database_dir(&config.database.url).await?;

        // Initialize database
        let db = BlogDatabase::connect(&config.database.url).await?;
        db.init().await?;

        let cache: Arc<dyn PageCache> = Arc::new(TtlCache::new(config.cache.capacity));
        Self::from_parts(config, db, cache).await
    }

    /// Assemble the state around an existing store and page cache.
    pub async fn from_parts(config: Config, db: BlogDatabase, feed_cache: Arc<dyn PageCache>) -> anyhow::Result<Self> {
        let media = MediaStorage::new(config.media.root.clone());
        media.ensure_dirs().await?;

        let feed_service = FeedService::new(
            db.clone(),
            Paginator::new(config.feed.per_page),
            feed_cache.clone(),
            config.cache.ttl(),
        );

        Ok(Self {
            post_service: PostService::new(db.clone(), media.clone()),
            comment_service: CommentService::new(db.clone()),
            follow_service: FollowService::new(db.clone()),
            account_service: AccountService::new(db.clone()),
            feed_service,
            db,
            feed_cache,
            media,
            config,
        })
    }
}

/// File-backed SQLite needs its parent directory before the first connect.
async fn ensure_database_dir(url: &str) -> anyhow::Result<()> {
    if url.contains(":memory:") {
        return Ok(());
    }
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}
