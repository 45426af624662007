//! Operator tooling: keyspace dump and store reset.
//!
//! Not part of the ranking engine. Reached only through the server's
//! one-shot flags.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;

use crate::engine::{ARTICLE_COUNTER, SCORE_RANKING, TIME_RANKING};
use crate::stores::{Keyspace, KvStore};

/// Everything in the store, grouped by key namespace.
#[derive(Debug, Default, PartialEq)]
pub struct KeyspaceDump {
    /// Last allocated article id.
    pub counter: Option<String>,
    pub articles: BTreeMap<String, HashMap<String, String>>,
    pub voters: BTreeMap<String, Vec<String>>,
    /// Global rankings and cached group rankings.
    pub rankings: BTreeMap<String, Vec<(String, f64)>>,
    pub groups: BTreeMap<String, Vec<String>>,
    pub other: Vec<String>,
}

impl KeyspaceDump {
    pub fn key_count(&self) -> usize {
        usize::from(self.counter.is_some())
            + self.articles.len()
            + self.voters.len()
            + self.rankings.len()
            + self.groups.len()
            + self.other.len()
    }
}

/// Scan every key, read it by namespace, and log the contents.
pub async fn dump(keyspace: &dyn Keyspace, store: &dyn KvStore) -> Result<KeyspaceDump> {
    let mut dump = KeyspaceDump::default();

    for key in keyspace.scan_keys("*").await? {
        if key == ARTICLE_COUNTER {
            dump.counter = store.get(&key).await?;
        } else if key.starts_with("article:") {
            let fields = store.hgetall(&key).await?;
            dump.articles.insert(key, fields);
        } else if key.starts_with("voted:") {
            let mut members = store.smembers(&key).await?;
            members.sort();
            dump.voters.insert(key, members);
        } else if key.starts_with(SCORE_RANKING) || key.starts_with(TIME_RANKING) {
            let entries = store.zrange_with_scores(&key, 0, -1).await?;
            dump.rankings.insert(key, entries);
        } else if key.starts_with("group:") {
            let mut members = store.smembers(&key).await?;
            members.sort();
            dump.groups.insert(key, members);
        } else {
            dump.other.push(key);
        }
    }

    log_dump(&dump);
    Ok(dump)
}

fn log_dump(dump: &KeyspaceDump) {
    if let Some(counter) = &dump.counter {
        tracing::info!(key = ARTICLE_COUNTER, value = %counter, "counter");
    }
    for (key, fields) in &dump.articles {
        let mut fields: Vec<_> = fields.iter().collect();
        fields.sort();
        for (field, value) in fields {
            tracing::info!(%key, %field, %value, "article");
        }
    }
    for (key, entries) in &dump.rankings {
        for (member, score) in entries {
            tracing::info!(%key, %member, score, "ranking");
        }
    }
    for (key, members) in &dump.voters {
        for member in members {
            tracing::info!(%key, %member, "voted");
        }
    }
    for (key, members) in &dump.groups {
        for member in members {
            tracing::info!(%key, %member, "group");
        }
    }
    for key in &dump.other {
        tracing::info!(%key, "unrecognized key");
    }
    tracing::info!(keys = dump.key_count(), "dump complete");
}

/// Delete every key in the store.
pub async fn flush(keyspace: &dyn Keyspace) -> Result<()> {
    keyspace.flush().await?;
    tracing::warn!("store flushed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::engine::{Engine, Ranking};
    use crate::stores::{MemoryKvStore, MockKeyspace};

    #[tokio::test]
    async fn dump_classifies_keys_by_namespace() {
        let store = Arc::new(MemoryKvStore::new());
        let engine = Engine::new(store.clone());
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        engine
            .create_article("sky", "This is sky", "https://sky.com", now)
            .await
            .unwrap();
        engine
            .add_to_groups("article:1", &["java".to_string()])
            .await
            .unwrap();
        engine.group_articles("java", Ranking::Score, 1).await.unwrap();
        store.set_raw("session:abc", "x").await.unwrap();

        let dump = dump(store.as_ref(), store.as_ref()).await.unwrap();

        assert_eq!(dump.counter.as_deref(), Some("1"));
        assert_eq!(dump.articles["article:1"]["poster"], "sky");
        assert_eq!(dump.voters["voted:1"], vec!["sky"]);
        assert_eq!(
            dump.rankings.keys().collect::<Vec<_>>(),
            vec!["score:", "score:java", "time:"]
        );
        assert_eq!(dump.groups["group:java"], vec!["article:1"]);
        assert_eq!(dump.other, vec!["session:abc"]);
        assert_eq!(dump.key_count(), 8);
    }

    #[tokio::test]
    async fn dump_of_empty_store_is_empty() {
        let store = MemoryKvStore::new();

        assert_eq!(dump(&store, &store).await.unwrap(), KeyspaceDump::default());
    }

    #[tokio::test]
    async fn flush_clears_store() {
        let store = MemoryKvStore::new();
        store.incr(ARTICLE_COUNTER).await.unwrap();

        flush(&store).await.unwrap();

        assert!(store.scan_keys("*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn flush_propagates_store_failure() {
        let mut keyspace = MockKeyspace::new();
        keyspace
            .expect_flush()
            .returning(|| Err(anyhow::anyhow!("NOPERM")));

        assert!(flush(&keyspace).await.is_err());
    }
}
