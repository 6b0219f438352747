//! Update Cache - backing store for a release update server
//!
//! Provides an expiring key-value cache and a non-blocking resource lock,
//! both owned by the server process and handed to the update resolver.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{ReleaseHandle, UpdateCache};
pub use config::Config;
pub use error::{CacheError, ConfigError};
pub use tasks::spawn_cleanup_task;
