//! treesync CLI
//!
//! Pushes tracked content to remote tree stores and fetches it back.

mod cli;
mod commands;
mod context;
mod error;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Sync tracked content with tree stores", "treesync".green().bold());
            println!();
            println!("Run {} for available commands.", "treesync --help".cyan());
            Ok(())
        }
    }
}

/// Log to stderr so command output on stdout stays clean.
///
/// `--verbose` shows everything down to DEBUG; otherwise `RUST_LOG` decides,
/// defaulting to warnings only.
fn init_tracing(verbose: bool) {
    let builder = FmtSubscriber::builder().with_writer(std::io::stderr);
    if verbose {
        let subscriber = builder
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = builder.with_env_filter(filter).with_target(false).finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    let cwd = std::env::current_dir()?;
    match cmd {
        Commands::Init {
            remotes,
            store,
            force,
        } => commands::run_init(&cwd, &remotes, store.as_deref(), force),
        Commands::Push {
            force,
            strategy,
            dry_run,
            message,
        } => commands::run_push(&cwd, force, strategy, dry_run, message),
        Commands::Fetch { paths } => commands::run_fetch(&cwd, &paths),
        Commands::Status => commands::run_status(&cwd),
        Commands::Remotes => commands::run_remotes(&cwd),
        Commands::InstallHooks { force } => commands::run_install_hooks(&cwd, force),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "treesync",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
