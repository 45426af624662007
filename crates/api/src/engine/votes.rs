//! Vote eligibility and application.

use chrono::{DateTime, Utc};

use super::error::StoreContext;
use super::{Engine, EngineError, SCORE_RANKING, TIME_RANKING, VOTE_SCORE, article_id, voted_key};
use crate::models::fields;
use crate::stores::Batch;

/// Why a vote was not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteRejection {
    /// The article has no entry in the time ranking.
    UnknownArticle,
    /// The article's creation time is before the voting cutoff.
    WindowClosed,
    /// The user already voted on this article.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Applied,
    Rejected(VoteRejection),
}

impl Engine {
    /// Cast `user`'s vote on the article stored under `article_key`.
    ///
    /// Votes are accepted while the article's time score is not before
    /// `now`. The voter-set add is the only concurrency gate: of any number
    /// of concurrent calls for the same user and article, at most one gets
    /// past it. If the following batch fails the user stays recorded as
    /// having voted and the error is a [`EngineError::PartialCommit`].
    pub async fn vote_article(
        &self,
        user: &str,
        article_key: &str,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome, EngineError> {
        let Some(created) = self
            .store
            .zscore(TIME_RANKING, article_key)
            .await
            .store_op("zscore", article_key)?
        else {
            return Ok(reject(user, article_key, VoteRejection::UnknownArticle));
        };

        let cutoff = now.timestamp() as f64;
        if created < cutoff {
            return Ok(reject(user, article_key, VoteRejection::WindowClosed));
        }

        let voted = voted_key(article_id(article_key)?);
        let first_vote = self
            .store
            .sadd(&voted, user)
            .await
            .store_op("sadd", &voted)?;

        if !first_vote {
            return Ok(reject(user, article_key, VoteRejection::Duplicate));
        }

        let batch = Batch::new()
            .zincr(SCORE_RANKING, article_key, VOTE_SCORE)
            .hincr(article_key, fields::VOTES, 1);

        self.store
            .commit(batch)
            .await
            .partial("vote", article_key)?;

        tracing::info!(article = %article_key, user, "vote applied");

        Ok(VoteOutcome::Applied)
    }
}

fn reject(user: &str, article_key: &str, reason: VoteRejection) -> VoteOutcome {
    tracing::info!(article = %article_key, user, ?reason, "vote rejected");
    VoteOutcome::Rejected(reason)
}
