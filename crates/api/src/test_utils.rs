//! Shared test utilities for API handler tests.
//!
//! Provides a `TestStateBuilder` for constructing `AppState` over either an
//! in-memory store or a mockall mock, plus small response helpers.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::{TestStateBuilder, seed_article};
//!
//! let store = Arc::new(MemoryKvStore::new());
//! let key = seed_article(&store, "sky", 1_000).await;
//!
//! let state = TestStateBuilder::new()
//!     .with_store(store)
//!     .build();
//! ```

use std::sync::Arc;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::engine::{Engine, article_key};
use crate::state::AppState;
use crate::stores::{KvStore, MemoryKvStore, MockKvStore};

/// Creates a test configuration with dummy values.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        redis_url: None,
        env: "test".to_string(),
    }
}

/// Creates an article posted at `time` (epoch seconds) and returns its key.
///
/// Any vote made with the wall clock lands after `time`, so the voting
/// window of a seeded article is already closed.
pub async fn seed_article(store: &Arc<MemoryKvStore>, poster: &str, time: i64) -> String {
    let engine = Engine::new(store.clone());
    let id = engine
        .create_article(
            poster,
            &format!("This is {poster}"),
            &format!("https://{poster}.com"),
            Utc.timestamp_opt(time, 0).unwrap(),
        )
        .await
        .unwrap();
    article_key(id)
}

/// Reads a JSON response body.
pub async fn json_body<T: DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Builder for constructing test `AppState`.
///
/// Uses an empty in-memory store unless one is explicitly set.
pub struct TestStateBuilder {
    store: Option<Arc<dyn KvStore>>,
}

impl TestStateBuilder {
    /// Creates a new builder with no store configured.
    pub fn new() -> Self {
        Self { store: None }
    }

    pub fn with_store(mut self, store: Arc<MemoryKvStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_mock_store(mut self, store: MockKvStore) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Builds the `AppState` using the configured store or a fresh one.
    pub fn build(self) -> AppState {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryKvStore::new()) as Arc<dyn KvStore>);

        AppState {
            config: test_config(),
            engine: Engine::new(store.clone()),
            store,
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
