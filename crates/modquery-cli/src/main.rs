//! modquery CLI
//!
//! Runs one query against a dependency graph snapshot and prints the result.

mod cli;
mod config;
mod error;
mod render;

use std::io::Write;

use clap::Parser;
use colored::Colorize;
use modquery_core::{Interrupt, QueryOptions, QueryRequest, StaticRepoRules, dispatch};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use config::{ConfigResolver, QueryConfig};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        eprintln!("Type 'modquery --help' for syntax and help.");
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("Verbose mode enabled");
        }
    }

    let cwd = std::env::current_dir()?;
    let config = ConfigResolver::new(cwd).resolve()?;
    execute(cli, config)
}

fn execute(cli: Cli, config: QueryConfig) -> Result<()> {
    let snapshot_path = cli
        .snapshot
        .clone()
        .or_else(|| config.snapshot.clone())
        .ok_or_else(|| {
            CliError::user("no snapshot given; pass --snapshot or set 'snapshot' in .modquery.toml")
        })?;
    let charset = cli.charset.or(config.charset).unwrap_or_default();

    let options = QueryOptions {
        base_module: cli.base_module,
        from: cli.from,
        extension_usages: cli.extension_usages,
        extension_filter: cli.extension_filter,
        include_unused: cli.include_unused || config.include_unused.unwrap_or(false),
        depth: cli.depth,
        limits: config.limits(),
    };
    let request = QueryRequest::from_residue(&cli.residue, options)?;

    let (snapshot, repo_rules) = dispatch::load_snapshot(&snapshot_path)?;
    let lookup = StaticRepoRules::new(repo_rules);
    let outcome = dispatch::run(&snapshot, &request, &lookup, &Interrupt::new())?;

    let rendered = render::render(&outcome, cli.output, charset)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
