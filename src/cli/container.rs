use std::path::PathBuf;
use std::sync::Arc;

use anchor_host::{HostNode, MemoryNode};
use anchor_locator::{AnchorEngine, AnchorLocator};
use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use super::output::{emit, OutputFormat};
use super::page::load_page;

#[derive(Args, Clone, Debug)]
pub struct ContainerArgs {
    /// Page fixture (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub page: PathBuf,

    /// Query locating the parent node
    #[arg(long)]
    pub parent: String,

    /// Marker class identifying the container
    #[arg(long)]
    pub marker: String,

    /// Number of consecutive calls to make
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,
}

#[derive(Debug, Serialize)]
pub struct ContainerReport {
    pub runs: Vec<ContainerRun>,
    /// Containers carrying the marker once all calls finished
    pub containers: usize,
}

#[derive(Debug, Serialize)]
pub struct ContainerRun {
    pub node: Option<String>,
    pub created: bool,
}

pub fn cmd_container(args: ContainerArgs, output: OutputFormat) -> Result<()> {
    if args.repeat == 0 {
        bail!("--repeat must be at least 1");
    }
    let page = load_page(&args.page)?;
    let engine = AnchorEngine::with_defaults(page.clone());
    let marker_query = format!(".{}", args.marker);
    let markers = || page.query_all(&page.root(), &marker_query).unwrap_or_default();

    let mut known: Vec<Arc<MemoryNode>> = markers();
    let mut runs = Vec::with_capacity(args.repeat as usize);
    for _ in 0..args.repeat {
        let run = match engine.ensure_container(&args.parent, &args.marker) {
            Some(node) => {
                let created = !known.iter().any(|existing| Arc::ptr_eq(existing, &node));
                if created {
                    known.push(Arc::clone(&node));
                }
                ContainerRun {
                    node: Some(node.node_id().to_string()),
                    created,
                }
            }
            None => ContainerRun {
                node: None,
                created: false,
            },
        };
        runs.push(run);
    }

    let containers = markers().len();
    let report = ContainerReport { runs, containers };
    emit(&output, &report, |report| {
        let mut lines: Vec<String> = report
            .runs
            .iter()
            .enumerate()
            .map(|(index, run)| match &run.node {
                Some(node) if run.created => format!("#{} created {}", index + 1, node),
                Some(node) => format!("#{} reused {}", index + 1, node),
                None => format!("#{} no container", index + 1),
            })
            .collect();
        lines.push(format!("Containers: {}", report.containers));
        lines
    })
}
