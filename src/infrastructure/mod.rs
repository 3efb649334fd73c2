// Core infrastructure modules
pub mod database;              // SQLite entity store
pub mod cache;                 // TTL page cache
pub mod media_storage;         // Uploaded image files
pub mod middleware;            // Viewer context middleware and extractors
pub mod security;              // Password hashing and sessions
pub mod traits;                // Infrastructure traits
pub mod viewer;                // Viewer context

pub use cache::{Cache, CacheEntry, TtlCache};
pub use database::BlogDatabase;
pub use media_storage::{MediaStorage, UploadedImage};
pub use traits::PageCache;
pub use viewer::{ViewerContext, ViewerType};
