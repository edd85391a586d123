use anyhow::Result;
use datepoll::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
