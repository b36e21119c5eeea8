//! # Build Args Command Implementation
//!
//! Prints the parallelism settings for the image build as `KEY=VALUE` lines
//! on stdout, ready to be passed as `--build-arg` values:
//!
//! ```bash
//! for arg in $(repo-provision build-args); do set -- "$@" --build-arg "$arg"; done
//! ```
//!
//! A one-line summary of what was detected goes to stderr. The image build
//! itself is not started.

use anyhow::Result;
use clap::Args;

use repo_provision::sizing::{self, BuildParallelism};

/// Arguments for the build-args command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgsArgs {
    /// Total host memory in bytes [default: detected]
    #[arg(long, value_name = "BYTES")]
    pub memory_bytes: Option<u64>,

    /// Logical CPU count [default: detected]
    #[arg(long, value_name = "N")]
    pub cpus: Option<usize>,
}

/// Execute the `build-args` command.
pub fn execute(args: BuildArgsArgs) -> Result<()> {
    let plan = plan_for(&args);
    for line in plan.build_args() {
        println!("{}", line);
    }
    Ok(())
}

fn plan_for(args: &BuildArgsArgs) -> BuildParallelism {
    let (memory, cpus) = match (args.memory_bytes, args.cpus) {
        (Some(memory), Some(cpus)) => (memory, cpus),
        (memory, cpus) => {
            let (detected_memory, detected_cpus) = sizing::detect_host();
            (memory.unwrap_or(detected_memory), cpus.unwrap_or(detected_cpus))
        }
    };

    let plan = BuildParallelism::for_host(memory, cpus);
    eprintln!(
        "Detected: {} CPUs, ~{}GB RAM allocated",
        cpus,
        plan.reserved_memory_gb()
    );
    plan
}
