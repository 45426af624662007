//! Redis implementation of the store contract.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

use super::{Batch, Keyspace, KvStore, WriteOp};

/// Keys fetched per SCAN round trip.
const SCAN_COUNT: u32 = 100;

/// Redis implementation of KvStore and Keyspace.
#[derive(Clone)]
pub struct RedisKvStore {
    client: redis::Client,
}

impl RedisKvStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn ping(&self) -> Result<bool> {
        let mut conn = self.connection().await?;
        let result: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(result == "PONG")
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection().await?;
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.expire(key, ttl_secs as i64).await?;
        Ok(())
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let added: i64 = conn.sadd(key, member).await?;
        Ok(added == 1)
    }

    async fn srem(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.srem(key, member).await?;
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn scard(&self, key: &str) -> Result<u64> {
        let mut conn = self.connection().await?;
        let count: u64 = conn.scard(key).await?;
        Ok(count)
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.zadd(key, member, score).await?;
        Ok(())
    }

    async fn zincr(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        let mut conn = self.connection().await?;
        let score: f64 = conn.zincr(key, member, delta).await?;
        Ok(score)
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>> {
        let mut conn = self.connection().await?;
        let score: Option<f64> = conn.zscore(key, member).await?;
        Ok(score)
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let members: Vec<String> = conn.zrange(key, start as isize, stop as isize).await?;
        Ok(members)
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(String, f64)>> {
        let mut conn = self.connection().await?;
        let entries: Vec<(String, f64)> = conn
            .zrange_withscores(key, start as isize, stop as isize)
            .await?;
        Ok(entries)
    }

    async fn zinterstore(
        &self,
        dest: &str,
        set_key: &str,
        ranking_key: &str,
        ttl_secs: u64,
    ) -> Result<i64> {
        let mut conn = self.connection().await?;

        // Plain set members count as score 1; weight 0 drops them from the sum.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("ZINTERSTORE")
            .arg(dest)
            .arg(2)
            .arg(set_key)
            .arg(ranking_key)
            .arg("WEIGHTS")
            .arg(0)
            .arg(1)
            .expire(dest, ttl_secs as i64)
            .ignore();

        let (count,): (i64,) = pipe.query_async(&mut conn).await?;
        Ok(count)
    }

    async fn hset_multiple(&self, key: &str, fields: Vec<(String, String)>) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.hset_multiple(key, fields.as_slice()).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(fields)
    }

    async fn commit(&self, batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();

        for op in batch.ops() {
            match op {
                WriteOp::HashSet { key, fields } => {
                    pipe.hset_multiple(key, fields.as_slice()).ignore();
                }
                WriteOp::HashIncr { key, field, delta } => {
                    pipe.hincr(key, field, *delta).ignore();
                }
                WriteOp::SortedSetAdd { key, member, score } => {
                    pipe.zadd(key, member, *score).ignore();
                }
                WriteOp::SortedSetIncr { key, member, delta } => {
                    pipe.zincr(key, member, *delta).ignore();
                }
            }
        }

        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl Keyspace for RedisKvStore {
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }

    async fn flush(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(())
    }
}
