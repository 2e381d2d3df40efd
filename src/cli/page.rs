//! Fixture loading shared by the page-driven commands

use std::path::Path;
use std::sync::Arc;

use anchor_host::{DocumentSpec, MemoryHostTree};
use anchor_locator::CandidateConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

pub fn load_page(path: &Path) -> Result<Arc<MemoryHostTree>> {
    let spec = DocumentSpec::load(path)
        .with_context(|| format!("Failed to load page fixture {}", path.display()))?;
    let tree = MemoryHostTree::from_spec(&spec)
        .with_context(|| format!("Failed to build page from {}", path.display()))?;
    debug!(page = %path.display(), ready_state = %spec.ready_state, "page loaded");
    Ok(Arc::new(tree))
}

/// Candidate file: either a bare list or `{ candidates: [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateFile {
    List(Vec<CandidateConfig>),
    Wrapped { candidates: Vec<CandidateConfig> },
}

pub fn load_candidates(path: &Path) -> Result<Vec<CandidateConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates file {}", path.display()))?;
    let parsed: CandidateFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse candidates file {}", path.display()))?;
    Ok(match parsed {
        CandidateFile::List(candidates) => candidates,
        CandidateFile::Wrapped { candidates } => candidates,
    })
}
