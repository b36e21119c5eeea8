//! Typed provisioning steps and their lowering to `git` invocations.
//!
//! A fresh repository goes through [`Step::Clone`], [`Step::Checkout`],
//! [`Step::SyncSubmodules`] and, when patches exist, [`Step::ApplyPatches`],
//! strictly in that order. Each step becomes exactly one [`Invocation`].
//!
//! [`Step::AbortPatches`] only runs when resuming an entry whose patch
//! application was interrupted. A failed `am` leaves its session behind in
//! `.git/rebase-apply`, and `git` refuses to start another until it is
//! aborted.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::manifest::ManifestEntry;
use crate::runner::Invocation;

/// One external operation in the provisioning sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Clone `url` into `destination`.
    Clone { url: String, destination: PathBuf },
    /// Check out the pinned commit inside the destination.
    Checkout { commit: String },
    /// `submodule update --init --recursive` inside the destination.
    SyncSubmodules,
    /// Apply every patch, in order, as a single `am` invocation.
    ApplyPatches { patches: Vec<PathBuf> },
    /// `am --abort` inside the destination.
    AbortPatches,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Clone { .. } => "clone",
            Step::Checkout { .. } => "checkout",
            Step::SyncSubmodules => "submodule-sync",
            Step::ApplyPatches { .. } => "apply-patches",
            Step::AbortPatches => "abort-patches",
        }
    }
}

/// Builds invocations for a particular `git` executable and remote host.
#[derive(Debug, Clone)]
pub struct GitCommands {
    program: OsString,
    remote_base: String,
}

impl GitCommands {
    pub fn new(program: impl Into<OsString>, remote_base: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            remote_base: remote_base.into(),
        }
    }

    /// Clone URL for an entry: `<remote_base>/<organization>/<repository>.git`.
    pub fn remote_url(&self, entry: &ManifestEntry) -> String {
        format!(
            "{}/{}/{}.git",
            self.remote_base.trim_end_matches('/'),
            entry.organization,
            entry.repository
        )
    }

    /// The clone step for `entry` into `destination`.
    pub fn clone_step(&self, entry: &ManifestEntry, destination: &Path) -> Step {
        Step::Clone {
            url: self.remote_url(entry),
            destination: destination.to_path_buf(),
        }
    }

    /// Lower a step to an invocation. Every step except the clone runs with
    /// `destination` as its working directory.
    pub fn invocation(&self, step: &Step, destination: &Path) -> Invocation {
        let git = Invocation::new(self.program.clone());
        match step {
            Step::Clone { url, destination } => git
                .arg("clone")
                .arg(url.as_str())
                .arg(destination.as_os_str()),
            Step::Checkout { commit } => git
                .arg("checkout")
                .arg(commit.as_str())
                .current_dir(destination),
            Step::SyncSubmodules => git
                .args(["submodule", "update", "--init", "--recursive"])
                .current_dir(destination),
            Step::ApplyPatches { patches } => git
                .arg("am")
                .args(patches.iter().map(|p| p.as_os_str()))
                .current_dir(destination),
            Step::AbortPatches => git.args(["am", "--abort"]).current_dir(destination),
        }
    }
}
