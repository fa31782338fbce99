use anyhow::Result;
use clap::Parser;
use pocketbook::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    pocketbook::logging::init_tracing(cli.verbose);
    cli.run().await
}
