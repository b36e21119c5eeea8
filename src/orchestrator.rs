//! # Provisioning Orchestrator
//!
//! Drives each selected manifest entry through clone, checkout, submodule
//! sync and patch application, one entry at a time in manifest order.
//!
//! ## Per-entry sequence
//!
//! 1. Entries outside the [`Selection`](crate::config::Selection) are skipped
//!    silently.
//! 2. The idempotency check decides whether anything needs doing (see
//!    [`IdempotencyMode`]). A skipped entry runs no commands at all, even if
//!    its pinned commit or patch set has changed since.
//! 3. Otherwise the destination's parent is created and `clone`, `checkout`
//!    and `submodule update --init --recursive` run in strict sequence.
//! 4. Patches found by the [patch locator](crate::patches) are applied after
//!    the submodule sync, all in a single `am` invocation.
//!
//! Any command failure aborts the whole run. Nothing is rolled back; the
//! state record shows how far the entry got, and the next run resumes from
//! there in [`IdempotencyMode::Tracked`]:
//!
//! - a record still at [`Stage::Absent`] means the clone never finished, so
//!   whatever it left at the destination is removed and cloned again;
//! - a record at [`Stage::Synced`] with patches pending means `am` failed or
//!   was interrupted, so its session is aborted and the pinned commit checked
//!   out again before all patches are reapplied.
//!
//! In
//! [`IdempotencyMode::LegacyExistence`] the next run treats the half-done
//! destination as finished.
//!
//! ## Concurrency
//!
//! Runs are strictly sequential and there is no locking. Run at most one
//! instance per destination root at a time: two runs racing on the same
//! destination can both pass the existence check before either clones.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{IdempotencyMode, ProvisionConfig};
use crate::error::{Error, Result};
use crate::manifest::ManifestEntry;
use crate::output::{Event, Reporter, SkipReason};
use crate::patches::{self, PatchSet};
use crate::pipeline::{GitCommands, Step};
use crate::runner::CommandRunner;
use crate::state::{Stage, StateRecord, StateStore};

/// Counts of what a run did with each manifest line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries cloned from scratch.
    pub provisioned: usize,
    /// Entries continued from a previous run's record.
    pub resumed: usize,
    /// Entries short-circuited by the idempotency check.
    pub skipped: usize,
    /// Entries outside the selection.
    pub filtered: usize,
    /// Lines that were not `<org> <repo> <commit>`.
    pub malformed: usize,
}

/// What the idempotency check decided for one entry.
#[derive(Debug)]
enum Plan {
    Skip {
        reason: SkipReason,
        record: Option<StateRecord>,
    },
    Fresh,
    Resume {
        from: Stage,
        previous: StateRecord,
    },
}

/// Runs the provisioning sequence for a manifest.
pub struct Orchestrator<'a> {
    config: &'a ProvisionConfig,
    runner: &'a dyn CommandRunner,
    git: GitCommands,
    store: StateStore,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a ProvisionConfig, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            runner,
            git: config.git_commands(),
            store: StateStore::for_root(&config.root),
        }
    }

    /// Provision every selected entry in order.
    ///
    /// Malformed entries are reported and skipped; any other error, including
    /// I/O errors while reading the manifest, ends the run immediately.
    pub fn run<I>(&self, entries: I, reporter: &mut dyn Reporter) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<ManifestEntry>>,
    {
        let mut summary = RunSummary::default();
        let mut matched: BTreeSet<String> = BTreeSet::new();

        for parsed in entries {
            let entry = match parsed {
                Ok(entry) => entry,
                Err(Error::MalformedEntry { line_number, line }) => {
                    reporter.report(Event::Malformed { line_number, line });
                    summary.malformed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if !self.config.selection.contains(&entry.repository) {
                summary.filtered += 1;
                continue;
            }
            matched.insert(entry.repository.clone());

            self.provision(&entry, reporter, &mut summary)?;
        }

        for name in self.config.selection.names() {
            if !matched.contains(name) {
                reporter.report(Event::UnknownSelection {
                    name: name.to_string(),
                });
            }
        }

        reporter.report(Event::Done);
        debug!("run summary: {:?}", summary);
        Ok(summary)
    }

    fn provision(
        &self,
        entry: &ManifestEntry,
        reporter: &mut dyn Reporter,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let destination = entry.destination(&self.config.root);
        let patch_set = patches::locate(&self.config.patches_root, &entry.repository)?;

        let start = match self.plan(entry, &destination)? {
            Plan::Skip { reason, record } => {
                reporter.report(Event::Skipped {
                    repository: entry.repository.clone(),
                    destination: destination.clone(),
                    reason,
                });
                if let Some(record) = record {
                    self.report_drift(entry, &destination, &record, &patch_set, reporter);
                }
                summary.skipped += 1;
                return Ok(());
            }
            Plan::Fresh => {
                reporter.report(Event::Cloning {
                    slug: entry.slug(),
                    commit: entry.commit.clone(),
                });
                summary.provisioned += 1;
                Stage::Absent
            }
            Plan::Resume { from, previous } => {
                if previous.commit != entry.commit {
                    reporter.report(Event::Drift {
                        repository: entry.repository.clone(),
                        detail: format!(
                            "pinned commit changed from {} to {}; checking out again",
                            previous.commit, entry.commit
                        ),
                    });
                }
                reporter.report(Event::Resuming {
                    slug: entry.slug(),
                    commit: entry.commit.clone(),
                    stage: previous.stage,
                });
                summary.resumed += 1;

                if previous.stage == Stage::Synced && !patch_set.is_empty() {
                    // Patching was interrupted: drop the `am` session and
                    // apply everything again on top of the pinned commit.
                    self.abort_patches(&destination)?;
                    Stage::Cloned
                } else {
                    from
                }
            }
        };

        let mut record = StateRecord::new(entry, start);
        record.patches = patch_set.file_names();

        if record.stage < Stage::Cloned {
            if !self.config.dry_run {
                if destination.exists() {
                    debug!("removing unfinished clone at {}", destination.display());
                    fs::remove_dir_all(&destination)?;
                }
                if let Some(parent) = destination.parent() {
                    fs::create_dir_all(parent)?;
                }
            }
            // A destination with an `Absent` record is an unfinished clone.
            self.advance(&mut record, Stage::Absent)?;
            self.execute(&self.git.clone_step(entry, &destination), &destination)?;
            self.advance(&mut record, Stage::Cloned)?;
        }

        if record.stage < Stage::Synced {
            let checkout = Step::Checkout {
                commit: entry.commit.clone(),
            };
            self.execute(&checkout, &destination)?;
            self.execute(&Step::SyncSubmodules, &destination)?;
            self.advance(&mut record, Stage::Synced)?;
        }

        if record.stage < Stage::Patched && !patch_set.is_empty() {
            reporter.report(Event::Patching {
                repository: entry.repository.clone(),
                count: patch_set.len(),
            });
            let apply = Step::ApplyPatches {
                patches: patch_set.paths().to_vec(),
            };
            self.execute(&apply, &destination)?;
            self.advance(&mut record, Stage::Patched)?;
        }

        self.advance(&mut record, Stage::Complete)
    }

    fn plan(&self, entry: &ManifestEntry, destination: &Path) -> Result<Plan> {
        if !destination.exists() {
            return Ok(Plan::Fresh);
        }

        if self.config.idempotency == IdempotencyMode::LegacyExistence {
            return Ok(Plan::Skip {
                reason: SkipReason::AlreadyExists,
                record: None,
            });
        }

        Ok(match self.store.load(&entry.repository)? {
            // Provisioned before records existed, or by hand.
            None => Plan::Skip {
                reason: SkipReason::AlreadyExists,
                record: None,
            },
            Some(record) if record.is_complete() => Plan::Skip {
                reason: SkipReason::Complete,
                record: Some(record),
            },
            Some(record) => {
                // A record still at `Absent` means the clone never finished.
                let from = if record.stage > Stage::Absent && record.commit != entry.commit {
                    Stage::Cloned
                } else {
                    record.stage
                };
                Plan::Resume {
                    from,
                    previous: record,
                }
            }
        })
    }

    /// Warn when a finished entry no longer matches what the manifest and
    /// patch directory describe. Nothing is changed on disk.
    fn report_drift(
        &self,
        entry: &ManifestEntry,
        destination: &Path,
        record: &StateRecord,
        current: &PatchSet,
        reporter: &mut dyn Reporter,
    ) {
        if record.commit != entry.commit {
            reporter.report(Event::Drift {
                repository: entry.repository.clone(),
                detail: format!(
                    "provisioned at {} but manifest pins {}; remove {} to reprovision",
                    record.commit,
                    entry.commit,
                    destination.display()
                ),
            });
        }

        if current.file_names() != record.patches {
            reporter.report(Event::Drift {
                repository: entry.repository.clone(),
                detail: format!(
                    "patch set changed since provisioning ({} applied, {} now present); remove {} to reprovision",
                    record.patches.len(),
                    current.len(),
                    destination.display()
                ),
            });
        }
    }

    /// `am --abort`, where having no session to abort is not an error.
    fn abort_patches(&self, destination: &Path) -> Result<()> {
        match self.execute(&Step::AbortPatches, destination) {
            Err(Error::CommandFailed { status, .. }) => {
                debug!("no patch session to abort in {} ({})", destination.display(), status);
                Ok(())
            }
            other => other,
        }
    }

    fn execute(&self, step: &Step, destination: &Path) -> Result<()> {
        debug!("{} step for {}", step.name(), destination.display());
        let invocation = self.git.invocation(step, destination);
        self.runner.run(&invocation)
    }

    fn advance(&self, record: &mut StateRecord, stage: Stage) -> Result<()> {
        record.stage = stage;
        if self.config.dry_run {
            return Ok(());
        }
        self.store.save(record)
    }
}

/// Where an entry's destination stands, without touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioning {
    /// Nothing at the destination path.
    Absent,
    /// The destination exists but no record describes it.
    Untracked,
    /// A record exists at this stage.
    Recorded(Stage),
}

/// Read-only report for one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStatus {
    pub repository: String,
    pub destination: PathBuf,
    pub state: Provisioning,
    /// Commit in the record, when it differs from the manifest's pin.
    pub recorded_commit: Option<String>,
    /// The patch directory no longer matches the recorded patch set.
    pub patches_changed: bool,
}

/// Inspect an entry's destination and state record. Runs no commands.
pub fn status(config: &ProvisionConfig, entry: &ManifestEntry) -> Result<EntryStatus> {
    let destination = entry.destination(&config.root);
    let mut status = EntryStatus {
        repository: entry.repository.clone(),
        destination,
        state: Provisioning::Absent,
        recorded_commit: None,
        patches_changed: false,
    };
    if !status.destination.exists() {
        return Ok(status);
    }

    let Some(record) = StateStore::for_root(&config.root).load(&entry.repository)? else {
        status.state = Provisioning::Untracked;
        return Ok(status);
    };

    status.state = Provisioning::Recorded(record.stage);
    if record.commit != entry.commit {
        status.recorded_commit = Some(record.commit.clone());
    }
    if record.is_complete() {
        let current = patches::locate(&config.patches_root, &entry.repository)?;
        status.patches_changed = current.file_names() != record.patches;
    }
    Ok(status)
}
