use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Redis connection URL. Unset runs against an in-memory store.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}
