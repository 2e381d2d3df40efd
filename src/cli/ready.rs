use std::path::PathBuf;
use std::time::{Duration, Instant};

use anchor_host::{HostDocument, ReadyState};
use anchor_locator::{AnchorEngine, AnchorLocator};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::debug;

use super::context::CliContext;
use super::output::{emit, OutputFormat};
use super::page::load_page;

#[derive(Args, Clone, Debug)]
pub struct ReadyArgs {
    /// Page fixture (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub page: PathBuf,

    /// Upper bound on the wait; defaults to `readiness_timeout_ms` from config
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Simulate the page reaching `complete` after this delay
    #[arg(long)]
    pub complete_after_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ReadyReport {
    pub ready: bool,
    pub initial_state: ReadyState,
    pub final_state: ReadyState,
    pub timeout_ms: u64,
    pub elapsed_ms: u64,
}

pub async fn cmd_ready(args: ReadyArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let page = load_page(&args.page)?;
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| ctx.config().readiness_timeout());
    let initial_state = page.ready_state();

    let signaller = args.complete_after_ms.map(|delay_ms| {
        let page = page.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            debug!(delay_ms, "simulating document completion");
            page.set_ready_state(ReadyState::Complete);
        })
    });

    let engine = AnchorEngine::with_defaults(page.clone());
    let started = Instant::now();
    let ready = engine.wait_until_ready(timeout).await;
    let elapsed = started.elapsed();
    if let Some(signaller) = signaller {
        signaller.abort();
    }

    let report = ReadyReport {
        ready,
        initial_state,
        final_state: page.ready_state(),
        timeout_ms: timeout.as_millis() as u64,
        elapsed_ms: elapsed.as_millis() as u64,
    };
    emit(&output, &report, |report| {
        vec![
            format!(
                "{} ({} -> {})",
                if report.ready { "ready" } else { "not ready" },
                report.initial_state,
                report.final_state
            ),
            format!(
                "Waited {} of {}",
                humantime::format_duration(Duration::from_millis(report.elapsed_ms)),
                humantime::format_duration(Duration::from_millis(report.timeout_ms))
            ),
        ]
    })
}
