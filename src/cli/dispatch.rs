use anyhow::Result;

use super::commands::Commands;
use super::container::cmd_container;
use super::context::CliContext;
use super::env::CliArgs;
use super::info::cmd_info;
use super::ready::cmd_ready;
use super::resolve::cmd_resolve;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    let output = cli.output.clone();
    match cli.command.clone() {
        Commands::Resolve(args) => cmd_resolve(args, ctx, output).await,
        Commands::Container(args) => cmd_container(args, output),
        Commands::Ready(args) => cmd_ready(args, ctx, output).await,
        Commands::Info => cmd_info(ctx, output),
    }
}
