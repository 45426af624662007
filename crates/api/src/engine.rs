//! Voting and ranking engine.
//!
//! Articles are ranked two ways: by score (creation time plus a fixed weight
//! per vote) and by creation time. Groups filter those rankings through a
//! short-lived cached intersection.
//!
//! The engine holds no state of its own. Every cross-request invariant rests
//! on a single atomic store call:
//!
//! - id allocation is an atomic counter increment
//! - "has this user voted" is the new-member result of a set add
//! - score and vote count move together in one batch
//!
//! Weak spots are deliberate and surface as [`EngineError::PartialCommit`]:
//! an id consumed without an article, or a voter recorded without credit.
//! [`Engine::reconcile`] repairs both on demand.

mod articles;
mod error;
mod groups;
mod maintenance;
mod rankings;
mod votes;

pub use error::EngineError;
pub use maintenance::ReconcileReport;
pub use votes::{VoteOutcome, VoteRejection};

use std::sync::Arc;

use shared::api::Order;

use crate::stores::KvStore;

/// Score added per accepted vote, and once at creation.
pub const VOTE_SCORE: f64 = 432.0;
/// How long per-article voter sets are kept (one week).
pub const VOTED_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Lifetime of a cached group ranking.
pub const GROUP_CACHE_TTL_SECS: u64 = 60;
pub const ARTICLES_PER_PAGE: i64 = 25;
/// Longest accepted group name, in characters.
pub const MAX_GROUP_NAME_LEN: usize = 64;

/// Counter used to allocate article ids.
pub const ARTICLE_COUNTER: &str = "article:";
pub const SCORE_RANKING: &str = "score:";
pub const TIME_RANKING: &str = "time:";

const ARTICLE_PREFIX: &str = "article:";
const VOTED_PREFIX: &str = "voted:";
const GROUP_PREFIX: &str = "group:";

pub fn article_key(id: u64) -> String {
    format!("{ARTICLE_PREFIX}{id}")
}

pub fn voted_key(id: u64) -> String {
    format!("{VOTED_PREFIX}{id}")
}

pub fn group_key(group: &str) -> String {
    format!("{GROUP_PREFIX}{group}")
}

/// Numeric id from the segment after `article:`.
pub fn article_id(key: &str) -> Result<u64, EngineError> {
    key.strip_prefix(ARTICLE_PREFIX)
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| EngineError::InvalidArticleKey(key.to_string()))
}

/// A global ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    Score,
    Time,
}

impl Ranking {
    pub fn key(self) -> &'static str {
        match self {
            Ranking::Score => SCORE_RANKING,
            Ranking::Time => TIME_RANKING,
        }
    }
}

impl From<Order> for Ranking {
    fn from(order: Order) -> Self {
        match order {
            Order::Score => Ranking::Score,
            Order::Time => Ranking::Time,
        }
    }
}

/// Entry point for every article, vote, group and ranking operation.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn KvStore>,
}

impl Engine {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }
}
