mod cli;
mod commands;
mod model;
mod passage;
mod pipeline;
mod randomize;
mod segment;
mod util;
mod validate;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Segment(args) => commands::segment::run(args),
        Commands::Randomize(args) => commands::randomize::run(args),
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Score(args) => commands::score::run(args),
        Commands::Audit(args) => commands::audit::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
