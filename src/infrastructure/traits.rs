use async_trait::async_trait;
use std::time::Duration;

/// Process-wide cache of rendered pages, injected wherever a render is cached.
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl: Duration);
    async fn clear(&self);
}
