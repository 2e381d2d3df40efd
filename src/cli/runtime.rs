use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AnchorConfig;

const LOCAL_CONFIG: &str = "config/anchorctl.yaml";

pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    // Command output owns stdout; diagnostics go to stderr.
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(text_layer)
        .with(json_layer)
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: AnchorConfig,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let explicit = config_path.is_some();
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            // Priority: ./config/anchorctl.yaml > ~/.config/anchorctl/config.yaml
            let local_config = PathBuf::from(LOCAL_CONFIG);
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("anchorctl");
                path.push("config.yaml");
                path
            }
        }
    };

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config = AnchorConfig::from_yaml_str(&content)?;
        info!("Loaded configuration from: {}", config_path.display());
        config
    } else if explicit {
        anyhow::bail!("Config file not found: {}", config_path.display());
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        AnchorConfig::default()
    };

    config.apply_env_overrides()?;
    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[tokio::test]
    #[serial]
    async fn explicit_file_is_loaded_and_overridden() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine:\n  max_retries: 9\nreadiness_timeout_ms: 10").unwrap();

        std::env::set_var(crate::config::ENV_RETRY_DELAY_MS, "7");
        let loaded = load_config(Some(&file.path().to_path_buf())).await;
        std::env::remove_var(crate::config::ENV_RETRY_DELAY_MS);

        let loaded = loaded.unwrap();
        assert_eq!(loaded.config.engine.max_retries, 9);
        assert_eq!(loaded.config.engine.retry_delay_ms, 7);
        assert_eq!(loaded.config.readiness_timeout_ms, 10);
        assert_eq!(loaded.path, file.path());
    }

    #[tokio::test]
    #[serial]
    async fn missing_explicit_file_is_an_error() {
        let missing = PathBuf::from("definitely/not/here.yaml");
        assert!(load_config(Some(&missing)).await.is_err());
    }
}
