//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use repo_provision::output::OutputConfig;

use crate::commands;

/// Repository provisioning - clone pinned repositories and apply local patches
///
/// Without a subcommand, provisions every entry of the manifest (same as
/// `repo-provision provision`).
#[derive(Parser, Debug)]
#[command(name = "repo-provision")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    provision: commands::provision::ProvisionArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone, check out, sync and patch the repositories in the manifest
    Provision(commands::provision::ProvisionArgs),

    /// Show the provisioning state of each manifest entry
    Status(commands::status::StatusArgs),

    /// Print image build parallelism derived from host memory and CPUs
    BuildArgs(commands::build_args::BuildArgsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Some(Commands::Provision(args)) => commands::provision::execute(args, &output),
            Some(Commands::Status(args)) => commands::status::execute(args, &output),
            Some(Commands::BuildArgs(args)) => commands::build_args::execute(args),
            Some(Commands::Completions(args)) => commands::completions::execute(args),
            None => commands::provision::execute(self.provision, &output),
        }
    }
}

/// `RUST_LOG`, when set, takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
