use thiserror::Error;

/// Failures of engine operations.
///
/// Rejected votes are not errors; see [`VoteOutcome`](super::VoteOutcome).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{key} not found")]
    NotFound { key: String },

    #[error("invalid article key: {0}")]
    InvalidArticleKey(String),

    #[error("invalid group name {0:?}, expected 1 to 64 characters")]
    InvalidGroup(String),

    #[error("invalid page {0}, pages start at 1")]
    InvalidPage(u32),

    #[error("malformed record {key}: {reason}")]
    Malformed { key: String, reason: String },

    /// The store could not complete a call. Nothing after it ran.
    #[error("store {op} on {key} failed")]
    Store {
        op: &'static str,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// An earlier mutation committed but a dependent write did not.
    ///
    /// Left as is: an article id stays consumed, or a voter stays recorded
    /// without credit, until a reconcile pass runs.
    #[error("partial commit during {op} on {key}")]
    PartialCommit {
        op: &'static str,
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Tag store failures with the operation and key they hit.
pub(crate) trait StoreContext<T> {
    fn store_op(self, op: &'static str, key: &str) -> Result<T, EngineError>;

    /// For failures after an earlier write already landed.
    fn partial(self, op: &'static str, key: &str) -> Result<T, EngineError>;
}

impl<T> StoreContext<T> for anyhow::Result<T> {
    fn store_op(self, op: &'static str, key: &str) -> Result<T, EngineError> {
        self.map_err(|source| EngineError::Store {
            op,
            key: key.to_string(),
            source,
        })
    }

    fn partial(self, op: &'static str, key: &str) -> Result<T, EngineError> {
        self.map_err(|source| {
            tracing::error!(op, key, error = %source, "partial commit");
            EngineError::PartialCommit {
                op,
                key: key.to_string(),
                source,
            }
        })
    }
}
