//! Repair pass for partial commits.
//!
//! Normal operation never calls this. It exists for operators who want to
//! close the drift left by [`EngineError::PartialCommit`]. Run it while
//! writers are stopped: an article or vote still in flight looks exactly like
//! the drift being repaired.

use super::error::StoreContext;
use super::{
    ARTICLE_COUNTER, Engine, EngineError, SCORE_RANKING, TIME_RANKING, VOTE_SCORE, article_id,
    article_key, voted_key,
};
use crate::models::{Article, fields};
use crate::stores::Batch;

/// What a reconcile pass found and fixed.
#[derive(Debug, Default, PartialEq)]
pub struct ReconcileReport {
    /// Ids allocated by the counter that never got an article.
    pub orphaned_ids: Vec<u64>,
    /// Voter sets deleted because their article never existed.
    pub reclaimed_voter_sets: usize,
    /// Articles credited with votes they were missing, and by how many.
    pub credited: Vec<(String, i64)>,
}

impl Engine {
    /// Ids up to the counter's current value that have no article hash.
    pub async fn orphaned_ids(&self) -> Result<Vec<u64>, EngineError> {
        let last = match self
            .store
            .get(ARTICLE_COUNTER)
            .await
            .store_op("get", ARTICLE_COUNTER)?
        {
            Some(raw) => raw.parse::<u64>().map_err(|e| EngineError::Malformed {
                key: ARTICLE_COUNTER.to_string(),
                reason: e.to_string(),
            })?,
            None => 0,
        };

        let mut orphans = Vec::new();
        for id in 1..=last {
            let key = article_key(id);
            if !self.store.exists(&key).await.store_op("exists", &key)? {
                orphans.push(id);
            }
        }
        Ok(orphans)
    }

    /// Delete voter sets of orphaned ids and credit voters whose vote was
    /// recorded but never counted.
    ///
    /// Voter sets that already expired cannot be checked; those articles are
    /// left alone.
    pub async fn reconcile(&self) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport {
            orphaned_ids: self.orphaned_ids().await?,
            ..Default::default()
        };

        for id in &report.orphaned_ids {
            let voted = voted_key(*id);
            if self.store.del(&voted).await.store_op("del", &voted)? {
                report.reclaimed_voter_sets += 1;
            }
        }

        let keys = self
            .store
            .zrange(TIME_RANKING, 0, -1)
            .await
            .store_op("zrange", TIME_RANKING)?;

        for key in keys {
            let voted = voted_key(article_id(&key)?);
            let voters = self.store.scard(&voted).await.store_op("scard", &voted)? as i64;
            if voters == 0 {
                continue;
            }

            let hash = self.store.hgetall(&key).await.store_op("hgetall", &key)?;
            if hash.is_empty() {
                continue;
            }
            let article = Article::from_fields(&key, &hash)?;

            let missing = voters - article.votes;
            if missing <= 0 {
                continue;
            }

            let batch = Batch::new()
                .zincr(SCORE_RANKING, &key, VOTE_SCORE * missing as f64)
                .hincr(&key, fields::VOTES, missing);
            self.store.commit(batch).await.store_op("credit votes", &key)?;

            tracing::warn!(article = %key, missing, "credited uncounted votes");
            report.credited.push((key, missing));
        }

        tracing::info!(
            orphans = report.orphaned_ids.len(),
            reclaimed = report.reclaimed_voter_sets,
            credited = report.credited.len(),
            "reconcile finished"
        );

        Ok(report)
    }
}
