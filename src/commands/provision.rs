//! Provision command implementation
//!
//! Reads the manifest and, for each selected entry, runs the clone, checkout,
//! submodule sync and patch sequence. The first failing command ends the run
//! with a non-zero exit status.

use anyhow::Result;
use clap::Args;

use repo_provision::config::{IdempotencyMode, ProvisionConfig};
use repo_provision::defaults;
use repo_provision::manifest;
use repo_provision::orchestrator::Orchestrator;
use repo_provision::output::{ConsoleReporter, OutputConfig};
use repo_provision::runner::{CommandRunner, DryRunRunner, SystemRunner};

use super::ManifestArgs;

/// Arguments for the provision command
#[derive(Args, Debug, Clone)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub common: ManifestArgs,

    /// Base URL that `<organization>/<repository>.git` is appended to
    #[arg(long, value_name = "URL", env = "REPO_PROVISION_REMOTE", default_value = defaults::REMOTE_BASE)]
    pub remote_base: String,

    /// Version-control executable to run
    #[arg(long, value_name = "PROGRAM", env = "REPO_PROVISION_GIT", default_value = defaults::GIT_PROGRAM)]
    pub git: String,

    /// Treat any existing destination directory as provisioned, ignoring
    /// state records
    #[arg(long)]
    pub legacy_existence_check: bool,

    /// Show the commands that would run without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the provision command
pub fn execute(args: ProvisionArgs, output: &OutputConfig) -> Result<()> {
    let paths = args.common.resolve()?;
    log::debug!("provisioning with {:?}", paths);

    let idempotency = if args.legacy_existence_check {
        IdempotencyMode::LegacyExistence
    } else {
        IdempotencyMode::Tracked
    };

    let config = ProvisionConfig::new(paths.root)
        .with_patches_root(paths.patches)
        .with_remote_base(args.remote_base)
        .with_git_program(args.git)
        .with_idempotency(idempotency)
        .with_selection(args.common.selection())
        .with_dry_run(args.dry_run);

    let entries = manifest::from_file(&paths.manifest)?;

    let runner: &dyn CommandRunner = if args.dry_run {
        &DryRunRunner
    } else {
        &SystemRunner
    };
    let mut reporter = ConsoleReporter::new(output.clone());

    Orchestrator::new(&config, runner).run(entries, &mut reporter)?;
    Ok(())
}
