//! Ordered key-value store contract.
//!
//! Every engine operation goes through [`KvStore`]. The store is expected to
//! make each single call atomic; multi-step writes are grouped into a
//! [`Batch`] and applied with [`KvStore::commit`].

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

/// A queued write applied as part of a [`Batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    HashSet {
        key: String,
        fields: Vec<(String, String)>,
    },
    HashIncr {
        key: String,
        field: String,
        delta: i64,
    },
    SortedSetAdd {
        key: String,
        member: String,
        score: f64,
    },
    SortedSetIncr {
        key: String,
        member: String,
        delta: f64,
    },
}

/// Writes that commit together or not at all.
///
/// Readers may still observe a batch half-applied on stores that do not
/// isolate transactions from concurrent reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    ops: Vec<WriteOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hset_multiple(mut self, key: &str, fields: Vec<(String, String)>) -> Self {
        self.ops.push(WriteOp::HashSet {
            key: key.to_string(),
            fields,
        });
        self
    }

    pub fn hincr(mut self, key: &str, field: &str, delta: i64) -> Self {
        self.ops.push(WriteOp::HashIncr {
            key: key.to_string(),
            field: field.to_string(),
            delta,
        });
        self
    }

    pub fn zadd(mut self, key: &str, member: &str, score: f64) -> Self {
        self.ops.push(WriteOp::SortedSetAdd {
            key: key.to_string(),
            member: member.to_string(),
            score,
        });
        self
    }

    pub fn zincr(mut self, key: &str, member: &str, delta: f64) -> Self {
        self.ops.push(WriteOp::SortedSetIncr {
            key: key.to_string(),
            member: member.to_string(),
            delta,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Store for counters, sets, hashes and score-ordered sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Health check - verify the store answers.
    async fn ping(&self) -> Result<bool>;

    /// Atomically increment a counter, returning the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Read a plain string value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete a key (returns true if it existed).
    async fn del(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Set a TTL on an existing key. No-op if the key is absent.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()>;

    /// Add a set member. Returns true only if the member was not present.
    async fn sadd(&self, key: &str, member: &str) -> Result<bool>;

    async fn srem(&self, key: &str, member: &str) -> Result<()>;

    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    async fn scard(&self, key: &str) -> Result<u64>;

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()>;

    /// Increment a member's score, returning the new score.
    async fn zincr(&self, key: &str, member: &str, delta: f64) -> Result<f64>;

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>>;

    /// Members by ascending score between two ranks (inclusive, negative
    /// ranks count from the end).
    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    async fn zrange_with_scores(&self, key: &str, start: i64, stop: i64)
    -> Result<Vec<(String, f64)>>;

    /// Store the intersection of a plain set with a ranking under `dest`,
    /// expiring after `ttl_secs`.
    ///
    /// The result and its TTL land together or not at all. Scores come from
    /// the ranking alone. An empty intersection leaves no key behind.
    /// Returns the cardinality of the result.
    async fn zinterstore(
        &self,
        dest: &str,
        set_key: &str,
        ranking_key: &str,
        ttl_secs: u64,
    ) -> Result<i64>;

    async fn hset_multiple(&self, key: &str, fields: Vec<(String, String)>) -> Result<()>;

    /// All fields of a hash; empty if the key does not exist.
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Apply every queued write, or none of them.
    async fn commit(&self, batch: Batch) -> Result<()>;
}
