//! Ordered key-value store adapters.
//!
//! This module contains the store contract the ranking engine is written
//! against, plus its implementations.
//!
//! ## Stores
//!
//! - **redis** - Redis over a multiplexed async connection
//! - **memory** - In-process store for local runs and tests
//!
//! ## Key Patterns
//!
//! ```text
//! article:                 → id counter (INCR)
//! article:{id}             → hash: title, link, poster, time, votes
//! voted:{id}               → set of user ids that voted (expires after a week)
//! score:                   → sorted set: article key → time + votes * 432
//! time:                    → sorted set: article key → creation time
//! group:{name}             → set of article keys
//! {ranking}{name}          → cached group ranking, e.g. score:rust (60s TTL)
//! ```

mod keyspace;
mod kv;
mod memory;
mod redis_store;

pub use keyspace::Keyspace;
pub use kv::{Batch, KvStore, WriteOp};
pub use memory::MemoryKvStore;
pub use redis_store::RedisKvStore;

#[cfg(test)]
pub use keyspace::MockKeyspace;
#[cfg(test)]
pub use kv::MockKvStore;
