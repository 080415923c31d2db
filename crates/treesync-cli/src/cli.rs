//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use treesync_core::StrategySetting;

/// treesync - Sync tracked content with remote tree stores
#[derive(Parser, Debug)]
#[command(name = "treesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create .treesync/config.toml in the current repository
    ///
    /// Examples:
    ///   treesync init --remote primary --store /srv/treesync
    ///   treesync init -r primary -r mirror --store ../store
    Init {
        /// Remote names in precedence order; the first is the push target
        #[arg(short, long = "remote")]
        remotes: Vec<String>,

        /// Root directory of the tree store
        #[arg(short, long)]
        store: Option<String>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Push the working set to the first configured remote
    Push {
        /// Replace a remote snapshot that does not descend from local history
        #[arg(short, long)]
        force: bool,

        /// Upload strategy (as-before, content-only, content-and-text)
        #[arg(long)]
        strategy: Option<StrategySetting>,

        /// Build and check the snapshot without committing it
        #[arg(long)]
        dry_run: bool,

        /// Message recorded with the remote commit
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Fetch tracked content from the configured remotes
    ///
    /// Without paths every tracked entry that is not checked out is fetched.
    Fetch {
        /// Files or directories to fetch
        paths: Vec<String>,
    },

    /// Show configured remotes and whether a push would be accepted
    Status,

    /// List configured remotes in precedence order
    Remotes,

    /// Install a git pre-push hook that runs `treesync push`
    InstallHooks {
        /// Replace an existing hook not written by treesync
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   treesync completions bash > ~/.local/share/bash-completion/completions/treesync
    ///   treesync completions zsh > ~/.zfunc/_treesync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
