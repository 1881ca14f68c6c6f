use anyhow::Result;
use calendar_proxy::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
