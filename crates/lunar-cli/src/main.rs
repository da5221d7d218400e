use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod config;

use commands::{check::CheckCommand, dump::DumpCommand, list::ListCommand};

#[derive(Parser)]
#[command(name = "lunar", version, about = "Lua 5.3 bytecode inspector")]
struct Cli {
    /// Config file (defaults to lunar.toml or .lunarrc.toml found upward)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify and load a chunk
    Check(CheckCommand),
    /// List the instructions of every function
    List(ListCommand),
    /// Write the function tree as JSON
    Dump(DumpCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Check(cmd) => cmd.run(&config),
        Commands::List(cmd) => cmd.run(&config),
        Commands::Dump(cmd) => cmd.run(&config),
    }
}
