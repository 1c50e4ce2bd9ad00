//! vizaskctl - ask an analytics backend about a filtered dashboard view

use anyhow::Result;
use clap::Parser;
use vizaskctl::cli::Cli;
use vizaskctl::{commands, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let code = commands::run(cli).await?;
    std::process::exit(code);
}
