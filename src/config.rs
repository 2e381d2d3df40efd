//! CLI configuration
//!
//! `anchorctl` reads an [`AnchorConfig`] from YAML and then lets a handful of
//! `ANCHOR_*` environment variables override the engine options.

use std::time::Duration;

use anchor_locator::EngineOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const ENV_CACHE_TTL_MS: &str = "ANCHOR_CACHE_TTL_MS";
pub const ENV_MAX_RETRIES: &str = "ANCHOR_MAX_RETRIES";
pub const ENV_RETRY_DELAY_MS: &str = "ANCHOR_RETRY_DELAY_MS";
pub const ENV_CACHING: &str = "ANCHOR_CACHING";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub engine: EngineOptions,
    /// Default bound for `anchorctl ready`
    pub readiness_timeout_ms: u64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            engine: EngineOptions::default(),
            readiness_timeout_ms: 5_000,
        }
    }
}

impl AnchorConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults configuration.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    /// Apply `ANCHOR_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(raw) = env_var(ENV_CACHE_TTL_MS) {
            self.engine.cache_ttl_ms = parse_var(ENV_CACHE_TTL_MS, &raw)?;
        }
        if let Some(raw) = env_var(ENV_MAX_RETRIES) {
            self.engine.max_retries = parse_var(ENV_MAX_RETRIES, &raw)?;
        }
        if let Some(raw) = env_var(ENV_RETRY_DELAY_MS) {
            self.engine.retry_delay_ms = parse_var(ENV_RETRY_DELAY_MS, &raw)?;
        }
        if let Some(raw) = env_var(ENV_CACHING) {
            self.engine.caching_enabled = parse_flag(&raw)
                .with_context(|| format!("{} must be a boolean, got {:?}", ENV_CACHING, raw))?;
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 4] = [ENV_CACHE_TTL_MS, ENV_MAX_RETRIES, ENV_RETRY_DELAY_MS, ENV_CACHING];

    fn with_env<R>(vars: &[(&str, &str)], body: impl FnOnce() -> R) -> R {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let result = body();
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
        result
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AnchorConfig::from_yaml_str("engine:\n  max_retries: 7\n").unwrap();
        assert_eq!(config.engine.max_retries, 7);
        assert_eq!(config.engine.retry_delay_ms, 100);
        assert!(config.engine.caching_enabled);
        assert_eq!(config.readiness_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = AnchorConfig::from_yaml_str("  \n").unwrap();
        assert_eq!(config.engine.cache_ttl_ms, 30_000);
        assert_eq!(config.readiness_timeout_ms, 5_000);
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(AnchorConfig::from_yaml_str("engine: [1, 2").is_err());
    }

    #[test]
    #[serial]
    fn env_overrides_apply() {
        let config = with_env(
            &[
                (ENV_CACHE_TTL_MS, "250"),
                (ENV_MAX_RETRIES, " 1 "),
                (ENV_RETRY_DELAY_MS, "5"),
                (ENV_CACHING, "off"),
            ],
            || {
                let mut config = AnchorConfig::default();
                config.apply_env_overrides().map(|_| config)
            },
        )
        .unwrap();
        assert_eq!(config.engine.cache_ttl_ms, 250);
        assert_eq!(config.engine.max_retries, 1);
        assert_eq!(config.engine.retry_delay_ms, 5);
        assert!(!config.engine.caching_enabled);
    }

    #[test]
    #[serial]
    fn unset_env_leaves_config_untouched() {
        let config = with_env(&[], || {
            let mut config = AnchorConfig::default();
            config.apply_env_overrides().map(|_| config)
        })
        .unwrap();
        assert_eq!(config.engine, EngineOptions::default());
    }

    #[test]
    #[serial]
    fn unparseable_overrides_are_rejected() {
        for (key, value) in [
            (ENV_MAX_RETRIES, "lots"),
            (ENV_CACHE_TTL_MS, "-5"),
            (ENV_RETRY_DELAY_MS, "1.5"),
            (ENV_CACHING, "maybe"),
        ] {
            let outcome = with_env(&[(key, value)], || AnchorConfig::default().apply_env_overrides());
            let err = outcome.expect_err("override should be rejected");
            assert!(err.to_string().contains(key), "{key}: {err}");
        }
    }
}
