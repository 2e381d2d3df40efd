use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    anchor_cli::cli::run().await
}
