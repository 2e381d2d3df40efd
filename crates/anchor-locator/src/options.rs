use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for one engine instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub caching_enabled: bool,
    pub cache_ttl_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            caching_enabled: true,
            cache_ttl_ms: 30_000,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl EngineOptions {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Attempts per candidate; zero retries still means one attempt.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.caching_enabled = enabled;
        self
    }

    pub fn with_cache_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.cache_ttl_ms = ttl_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }
}
