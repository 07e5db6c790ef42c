//! Executor-wide defaults.
//!
//! Values on an individual `Request` always win; these only fill the gaps.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Sent when the request names no user agent of its own.
    pub user_agent: Option<String>,
    /// Applied when the request timeout is zero. Zero here too means the
    /// transport default.
    pub timeout_ms: u64,
    pub max_redirects: u32,
    pub max_response_bytes: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("restexec/", env!("CARGO_PKG_VERSION")).to_string()),
            timeout_ms: 0,
            max_redirects: 10,
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ExecutorConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
