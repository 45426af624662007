//! Paginated reads over rankings.

use super::error::StoreContext;
use super::{ARTICLES_PER_PAGE, Engine, EngineError, Ranking};
use crate::models::Article;

/// Inclusive rank range of a 1-indexed page.
fn page_bounds(page: u32) -> Result<(i64, i64), EngineError> {
    if page == 0 {
        return Err(EngineError::InvalidPage(page));
    }
    let page = i64::from(page);
    Ok(((page - 1) * ARTICLES_PER_PAGE, page * ARTICLES_PER_PAGE - 1))
}

impl Engine {
    /// One page of a global ranking.
    pub async fn articles(&self, ranking: Ranking, page: u32) -> Result<Vec<Article>, EngineError> {
        self.list_articles(ranking.key(), page).await
    }

    /// One page of any ranking, lowest score first.
    ///
    /// Members whose article hash is gone are skipped. A page past the end
    /// is empty.
    pub async fn list_articles(
        &self,
        ranking_key: &str,
        page: u32,
    ) -> Result<Vec<Article>, EngineError> {
        let (start, stop) = page_bounds(page)?;

        let keys = self
            .store
            .zrange(ranking_key, start, stop)
            .await
            .store_op("zrange", ranking_key)?;

        let mut articles = Vec::with_capacity(keys.len());
        for key in keys {
            let hash = self.store.hgetall(&key).await.store_op("hgetall", &key)?;
            if hash.is_empty() {
                tracing::debug!(ranking = ranking_key, article = %key, "skipping missing article");
                continue;
            }
            articles.push(Article::from_fields(&key, &hash)?);
        }

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::engine::{SCORE_RANKING, TIME_RANKING};
    use crate::stores::{KvStore, MemoryKvStore};

    async fn engine_with_articles(count: i64) -> (Arc<MemoryKvStore>, Engine) {
        let store = Arc::new(MemoryKvStore::new());
        let engine = Engine::new(store.clone());
        for i in 0..count {
            engine
                .create_article(
                    &format!("user{i}"),
                    &format!("Article {i}"),
                    &format!("https://example.com/{i}"),
                    Utc.timestamp_opt(1_000 + i, 0).unwrap(),
                )
                .await
                .unwrap();
        }
        (store, engine)
    }

    #[test]
    fn page_bounds_are_25_wide() {
        assert_eq!(page_bounds(1).unwrap(), (0, 24));
        assert_eq!(page_bounds(2).unwrap(), (25, 49));
        assert!(matches!(page_bounds(0), Err(EngineError::InvalidPage(0))));
    }

    #[tokio::test]
    async fn second_page_returns_ranks_25_to_49() {
        let (_, engine) = engine_with_articles(60).await;

        let page = engine.articles(Ranking::Time, 2).await.unwrap();

        assert_eq!(page.len(), 25);
        assert_eq!(page.first().unwrap().key, "article:26");
        assert_eq!(page.last().unwrap().key, "article:50");
    }

    #[tokio::test]
    async fn partial_last_page() {
        let (_, engine) = engine_with_articles(30).await;

        let page = engine.articles(Ranking::Score, 2).await.unwrap();

        assert_eq!(page.len(), 5);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let (_, engine) = engine_with_articles(3).await;

        assert!(engine.articles(Ranking::Score, 2).await.unwrap().is_empty());
        assert!(engine.list_articles("score:nothing", 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_are_ascending_by_score() {
        let (store, engine) = engine_with_articles(3).await;
        store.zincr(SCORE_RANKING, "article:1", 10_000.0).await.unwrap();

        let page = engine.articles(Ranking::Score, 1).await.unwrap();
        let keys: Vec<&str> = page.iter().map(|a| a.key.as_str()).collect();

        assert_eq!(keys, vec!["article:2", "article:3", "article:1"]);
    }

    #[tokio::test]
    async fn missing_article_hash_is_skipped() {
        let (store, engine) = engine_with_articles(2).await;
        store.del("article:1").await.unwrap();

        let page = engine.articles(Ranking::Time, 1).await.unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].key, "article:2");
        assert_eq!(
            store.zrange(TIME_RANKING, 0, -1).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn page_zero_is_rejected() {
        let (_, engine) = engine_with_articles(1).await;

        assert!(matches!(
            engine.articles(Ranking::Time, 0).await,
            Err(EngineError::InvalidPage(0))
        ));
    }
}
