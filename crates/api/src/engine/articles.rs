//! Article creation.

use chrono::{DateTime, Utc};

use super::error::StoreContext;
use super::{
    ARTICLE_COUNTER, Engine, EngineError, SCORE_RANKING, TIME_RANKING, VOTE_SCORE, VOTED_TTL_SECS,
    article_key, voted_key,
};
use crate::models::Article;
use crate::stores::Batch;

impl Engine {
    /// Create an article and return its id.
    ///
    /// The id is taken first and never given back. If anything after that
    /// fails the id stays consumed and the error is a
    /// [`EngineError::PartialCommit`]; no article exists under it.
    pub async fn create_article(
        &self,
        poster: &str,
        title: &str,
        link: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, EngineError> {
        let id = self
            .store
            .incr(ARTICLE_COUNTER)
            .await
            .store_op("incr", ARTICLE_COUNTER)? as u64;

        let key = article_key(id);
        let voted = voted_key(id);

        self.store
            .sadd(&voted, poster)
            .await
            .partial("seed voters", &voted)?;
        self.store
            .expire(&voted, VOTED_TTL_SECS)
            .await
            .partial("expire voters", &voted)?;

        let article = Article {
            key: key.clone(),
            title: title.to_string(),
            link: link.to_string(),
            poster: poster.to_string(),
            time: now.timestamp(),
            votes: 1,
        };
        let time = article.time as f64;

        let batch = Batch::new()
            .hset_multiple(&key, article.to_fields())
            .zadd(SCORE_RANKING, &key, time + VOTE_SCORE)
            .zadd(TIME_RANKING, &key, time);

        self.store
            .commit(batch)
            .await
            .partial("create article", &key)?;

        tracing::info!(article = %key, poster, "article created");

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::stores::{KvStore, MemoryKvStore, MockKvStore};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn create_article_initializes_record_rankings_and_voters() {
        let store = Arc::new(MemoryKvStore::new());
        let engine = Engine::new(store.clone());

        let id = engine
            .create_article("sky", "This is sky", "https://sky.com", at(1_000))
            .await
            .unwrap();

        assert_eq!(id, 1);
        let hash = store.hgetall("article:1").await.unwrap();
        let article = Article::from_fields("article:1", &hash).unwrap();
        assert_eq!(article.votes, 1);
        assert_eq!(article.poster, "sky");
        assert_eq!(article.time, 1_000);

        assert_eq!(store.smembers("voted:1").await.unwrap(), vec!["sky"]);
        assert_eq!(
            store.zscore(SCORE_RANKING, "article:1").await.unwrap(),
            Some(1_000.0 + VOTE_SCORE)
        );
        assert_eq!(
            store.zscore(TIME_RANKING, "article:1").await.unwrap(),
            Some(1_000.0)
        );
    }

    #[tokio::test]
    async fn ids_are_assigned_in_creation_order() {
        let store = Arc::new(MemoryKvStore::new());
        let engine = Engine::new(store.clone());

        let first = engine
            .create_article("sky", "This is sky", "https://sky.com", at(1_000))
            .await
            .unwrap();
        let second = engine
            .create_article("line", "This is line", "https://line.com", at(1_001))
            .await
            .unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(
            store.zrange(TIME_RANKING, 0, -1).await.unwrap(),
            vec!["article:1", "article:2"]
        );
        assert_eq!(store.zrange(SCORE_RANKING, 0, -1).await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn voter_set_expires_after_a_week() {
        let store = Arc::new(MemoryKvStore::new());
        let engine = Engine::new(store.clone());
        engine
            .create_article("sky", "This is sky", "https://sky.com", at(1_000))
            .await
            .unwrap();

        tokio::time::advance(std::time::Duration::from_secs(VOTED_TTL_SECS - 1)).await;
        assert!(store.exists("voted:1").await.unwrap());

        tokio::time::advance(std::time::Duration::from_secs(1)).await;
        assert!(!store.exists("voted:1").await.unwrap());
        assert!(store.exists("article:1").await.unwrap());
    }

    #[tokio::test]
    async fn counter_failure_is_store_error() {
        let mut store = MockKvStore::new();
        store
            .expect_incr()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let engine = Engine::new(Arc::new(store));
        let err = engine
            .create_article("sky", "This is sky", "https://sky.com", at(1_000))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Store { op: "incr", .. }));
    }

    #[tokio::test]
    async fn failed_batch_leaves_id_consumed() {
        let mut store = MockKvStore::new();
        store.expect_incr().returning(|_| Ok(7));
        store.expect_sadd().returning(|_, _| Ok(true));
        store.expect_expire().returning(|_, _| Ok(()));
        store
            .expect_commit()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("EXECABORT")));

        let engine = Engine::new(Arc::new(store));
        let err = engine
            .create_article("sky", "This is sky", "https://sky.com", at(1_000))
            .await
            .unwrap_err();

        match err {
            EngineError::PartialCommit { op, key, .. } => {
                assert_eq!(op, "create article");
                assert_eq!(key, "article:7");
            }
            other => panic!("expected partial commit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn batch_writes_hash_and_both_rankings() {
        let mut store = MockKvStore::new();
        store.expect_incr().returning(|_| Ok(3));
        store
            .expect_sadd()
            .with(mockall::predicate::eq("voted:3"), mockall::predicate::eq("sky"))
            .returning(|_, _| Ok(true));
        store
            .expect_expire()
            .with(
                mockall::predicate::eq("voted:3"),
                mockall::predicate::eq(VOTED_TTL_SECS),
            )
            .returning(|_, _| Ok(()));
        store
            .expect_commit()
            .withf(|batch| {
                let ops = batch.ops();
                ops.len() == 3
                    && ops.contains(&crate::stores::WriteOp::SortedSetAdd {
                        key: SCORE_RANKING.to_string(),
                        member: "article:3".to_string(),
                        score: 2_000.0 + VOTE_SCORE,
                    })
                    && ops.contains(&crate::stores::WriteOp::SortedSetAdd {
                        key: TIME_RANKING.to_string(),
                        member: "article:3".to_string(),
                        score: 2_000.0,
                    })
            })
            .returning(|_| Ok(()));

        let engine = Engine::new(Arc::new(store));

        assert_eq!(
            engine
                .create_article("sky", "This is sky", "https://sky.com", at(2_000))
                .await
                .unwrap(),
            3
        );
    }
}
