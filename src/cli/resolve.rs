use std::path::PathBuf;
use std::time::{Duration, Instant};

use anchor_host::MemoryNode;
use anchor_locator::{AnchorEngine, AnchorLocator, CacheStats, SearchResult};
use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use super::context::CliContext;
use super::output::{emit, OutputFormat};
use super::page::{load_candidates, load_page};

#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
    /// Page fixture (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub page: PathBuf,

    /// Candidate list (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub candidates: PathBuf,

    /// Cache key; searches without one bypass the cache
    #[arg(long)]
    pub key: Option<String>,

    /// Number of consecutive searches to run
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,
}

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub runs: Vec<ResolveRun>,
    pub lookups: usize,
    pub cache: CacheStats,
}

#[derive(Debug, Serialize)]
pub struct ResolveRun {
    pub found: bool,
    pub cached: bool,
    pub query: String,
    pub node: Option<String>,
    pub elapsed_ms: u64,
}

impl ResolveRun {
    fn new(result: &SearchResult<MemoryNode>, elapsed: Duration) -> Self {
        Self {
            found: result.found,
            cached: result.cached,
            query: result.query.clone(),
            node: result.node.as_ref().map(|node| node.describe()),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

pub async fn cmd_resolve(args: ResolveArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    if args.repeat == 0 {
        bail!("--repeat must be at least 1");
    }
    let page = load_page(&args.page)?;
    let candidates = load_candidates(&args.candidates)?;
    let engine = AnchorEngine::new(page.clone(), ctx.config().engine.clone());

    let mut runs = Vec::with_capacity(args.repeat as usize);
    for _ in 0..args.repeat {
        let started = Instant::now();
        let result = engine
            .find_element(&candidates, args.key.as_deref())
            .await;
        runs.push(ResolveRun::new(&result, started.elapsed()));
    }

    let report = ResolveReport {
        runs,
        lookups: page.query_count(),
        cache: engine.cache_stats(),
    };
    emit(&output, &report, render_human)
}

fn render_human(report: &ResolveReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, run) in report.runs.iter().enumerate() {
        let elapsed = humantime::format_duration(Duration::from_millis(run.elapsed_ms));
        let line = match &run.node {
            Some(node) if run.found => format!(
                "#{} found {} via {}{} in {}",
                index + 1,
                node,
                run.query,
                if run.cached { " (cached)" } else { "" },
                elapsed
            ),
            _ => format!("#{} not found after {}", index + 1, elapsed),
        };
        lines.push(line);
    }
    lines.push(format!("Lookups: {}", report.lookups));
    lines.push(format!(
        "Cache: size={} hits={} misses={} hit_rate={:.2}",
        report.cache.size, report.cache.hits, report.cache.misses, report.cache.hit_rate
    ));
    lines
}
