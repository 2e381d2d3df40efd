use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Print a command report: `human` renders the given lines, the structured
/// formats serialize `report`.
pub fn emit<T, F>(format: &OutputFormat, report: &T, human: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> Vec<String>,
{
    match format {
        OutputFormat::Human => {
            for line in human(report) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(report).context("Failed to serialize report")?;
            println!("{}", rendered);
        }
        OutputFormat::Yaml => {
            let rendered = serde_yaml::to_string(report).context("Failed to serialize report")?;
            print!("{}", rendered);
        }
    }
    Ok(())
}
