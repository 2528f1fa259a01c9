mod app;
mod cli;
mod config;
mod logging;
mod render;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logging::initialize(cli.log, cli.verbose);
    app::run(cli).await
}
