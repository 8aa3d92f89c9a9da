//! Stride CLI - dependency-graph database migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod prompt;

use cli::Cli;
use commands::{
    apply, clean, common, history, init, mark, new, remove, rollback, squash, unmark, validate,
};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match dispatch(&cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            if let Some(code) = e.downcast_ref::<common::ExitCode>() {
                return std::process::ExitCode::from(code.0);
            }
            eprintln!("Error: {e}");
            for cause in e.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            std::process::ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Init(args) => init::execute(args).await,
        cli::Commands::New(args) => new::execute(args, &cli.global).await,
        cli::Commands::Apply(args) => apply::execute(args, &cli.global).await,
        cli::Commands::Rollback(args) => rollback::execute(args, &cli.global).await,
        cli::Commands::History(args) => history::execute(args, &cli.global).await,
        cli::Commands::Mark(args) => mark::execute(args, &cli.global).await,
        cli::Commands::Unmark(args) => unmark::execute(args, &cli.global).await,
        cli::Commands::Remove(args) => remove::execute(args, &cli.global).await,
        cli::Commands::Squash(args) => squash::execute(args, &cli.global).await,
        cli::Commands::Validate(args) => validate::execute(args, &cli.global).await,
        cli::Commands::Clean(args) => clean::execute(args, &cli.global).await,
    }
}

/// Map `-v` counts onto a default log filter; `RUST_LOG` still wins.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
