use std::sync::Arc;

use crate::{config::Config, engine::Engine, stores::KvStore};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Backing store, for health checks.
    pub store: Arc<dyn KvStore>,
    /// Voting and ranking engine over the same store.
    pub engine: Engine,
}
