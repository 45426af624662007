//! Whole-keyspace operations for administration.
//!
//! Kept apart from [`KvStore`](super::KvStore) so the ranking engine can never
//! reach them.

use anyhow::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Keyspace: Send + Sync {
    /// Every key matching a glob pattern (`*` matches any run of characters).
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Drop every key in the current database.
    async fn flush(&self) -> Result<()>;
}
