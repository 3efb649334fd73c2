// Yatube - a small blogging platform: authors, groups, posts, comments and follows

// Access control over blog entities
pub mod ent_framework;

// Core types and primitives
pub mod core;

// Infrastructure - Database, caching, media and request viewers
pub mod infrastructure;

// Domain models
pub mod models;

// Business operations and form validation
pub mod services;

// HTTP surface
pub mod handlers;
pub mod views;
pub mod urls;
pub mod blog_interface;
pub mod app_state;

// Common utilities
pub mod config;
pub mod error;
pub mod data_seeder;

// Re-exports for convenience
pub use error::{AppError, AppResult};
