//! # Status Command Implementation
//!
//! Prints one line per selected manifest entry showing where its destination
//! stands:
//!
//! - `absent` - nothing on disk yet
//! - `untracked` - the destination exists but no state record describes it
//! - `partial` - a clone started but never finished
//! - `cloned`, `synced`, `patched` - a previous run stopped part-way
//! - `complete` - fully provisioned
//!
//! Drift between the record and the manifest (a different pinned commit, or a
//! changed patch directory) is noted after the state. Nothing is modified and
//! no external command runs.

use anyhow::Result;
use clap::Args;
use console::style;

use repo_provision::config::ProvisionConfig;
use repo_provision::error::Error;
use repo_provision::manifest;
use repo_provision::orchestrator::{self, EntryStatus, Provisioning};
use repo_provision::output::OutputConfig;
use repo_provision::state::Stage;

use super::ManifestArgs;

/// Show the provisioning state of each manifest entry
#[derive(Args, Debug, Clone, Default)]
pub struct StatusArgs {
    #[command(flatten)]
    pub common: ManifestArgs,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs, output: &OutputConfig) -> Result<()> {
    let paths = args.common.resolve()?;
    let selection = args.common.selection();
    let config = ProvisionConfig::new(paths.root).with_patches_root(paths.patches);

    for parsed in manifest::from_file(&paths.manifest)? {
        let entry = match parsed {
            Ok(entry) => entry,
            Err(Error::MalformedEntry { line_number, line }) => {
                eprintln!("Skipping malformed line {}: {:?}", line_number, line);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !selection.contains(&entry.repository) {
            continue;
        }

        let status = orchestrator::status(&config, &entry)?;
        println!("{}", format_status(&status, &entry.commit, output));
    }

    Ok(())
}

fn state_label(state: &Provisioning) -> String {
    match state {
        Provisioning::Absent => "absent".to_string(),
        Provisioning::Untracked => "untracked".to_string(),
        Provisioning::Recorded(Stage::Absent) => "partial".to_string(),
        Provisioning::Recorded(stage) => stage.to_string(),
    }
}

/// One status line: `<repository>  <state>  <destination>[  notes]`.
fn format_status(status: &EntryStatus, pinned: &str, output: &OutputConfig) -> String {
    let label = format!("{:<9}", state_label(&status.state));
    let styled = match status.state {
        Provisioning::Recorded(Stage::Complete) => style(label).green(),
        Provisioning::Absent => style(label).dim(),
        _ => style(label).yellow(),
    }
    .force_styling(output.use_color);

    let mut line = format!(
        "{}  {}  {}",
        status.repository,
        styled,
        status.destination.display()
    );
    if let Some(recorded) = &status.recorded_commit {
        line.push_str(&format!("  (recorded {}, manifest pins {})", recorded, pinned));
    }
    if status.patches_changed {
        line.push_str("  (patch set changed)");
    }
    line
}
