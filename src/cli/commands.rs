use clap::Subcommand;

use super::container::ContainerArgs;
use super::ready::ReadyArgs;
use super::resolve::ResolveArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Resolve an anchor in a page fixture through fallback candidates
    Resolve(ResolveArgs),

    /// Get or create a marker-tagged container under a parent
    Container(ContainerArgs),

    /// Wait for a page fixture to become ready
    Ready(ReadyArgs),

    /// Show version, build information and effective configuration
    Info,
}
