use anyhow::Result;
use serde::Serialize;

use super::context::CliContext;
use super::output::{emit, OutputFormat};
use crate::config::AnchorConfig;

#[derive(Debug, Serialize)]
pub struct InfoReport<'a> {
    pub version: &'static str,
    pub build_date: &'static str,
    pub git_commit: &'static str,
    pub config_path: String,
    pub config: &'a AnchorConfig,
}

pub fn cmd_info(ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let report = InfoReport {
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("BUILD_DATE"),
        git_commit: env!("GIT_HASH"),
        config_path: ctx.config_path().display().to_string(),
        config: ctx.config(),
    };

    emit(&output, &report, |report| {
        let engine = &report.config.engine;
        vec![
            "anchorctl System Information".to_string(),
            "============================".to_string(),
            format!("Version: {}", report.version),
            format!("Build Date: {}", report.build_date),
            format!("Git Commit: {}", report.git_commit),
            String::new(),
            "Configuration:".to_string(),
            format!("- Source: {}", report.config_path),
            format!("- Caching: {}", if engine.caching_enabled { "enabled" } else { "disabled" }),
            format!("- Cache TTL: {}", humantime::format_duration(engine.cache_ttl())),
            format!("- Max Retries: {}", engine.max_retries),
            format!("- Retry Delay: {}", humantime::format_duration(engine.retry_delay())),
            format!(
                "- Readiness Timeout: {}",
                humantime::format_duration(report.config.readiness_timeout())
            ),
        ]
    })
}
