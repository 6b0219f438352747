//! Cache Module
//!
//! Provides the expiring key-value store and the resource lock manager that
//! back the update resolver.

mod entry;
mod lock;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lock::{lock_key, LockMarker};
pub use shared::{ReleaseHandle, UpdateCache};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Key prefix separating lock entries from cached values
pub const LOCK_PREFIX: &str = "lock:";
