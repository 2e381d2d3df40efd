use std::path::{Path, PathBuf};

use crate::config::AnchorConfig;

pub struct CliContext {
    config: AnchorConfig,
    config_path: PathBuf,
}

impl CliContext {
    pub fn new(config: AnchorConfig, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
