//! # Repository Provisioning Library
//!
//! This library brings a set of external source repositories to pinned,
//! locally patched states on disk. It backs the `repo-provision` command-line
//! tool, which assembles a multi-repository build tree from a manifest of
//! `(organization, repository, commit)` triples.
//!
//! ## Quick Example
//!
//! ```
//! use repo_provision::manifest;
//!
//! let entries: Vec<_> = manifest::parse("acme repoA abc123\nbroken\n").collect();
//! assert_eq!(entries.len(), 2);
//! assert_eq!(entries[0].as_ref().unwrap().repository, "repoA");
//! assert!(entries[1].is_err());
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: line-oriented `org repo commit` triples,
//!   parsed lazily in file order. Malformed lines are reported, not fatal.
//! - **Patches (`patches`)**: `<patches_root>/<repository>/*`, applied in
//!   filename order after checkout and submodule sync.
//! - **Command runner (`runner`)**: blocking execution of external commands,
//!   echoed before they run.
//! - **Pipeline (`pipeline`)**: the typed steps Clone, Checkout,
//!   SyncSubmodules, ApplyPatches and their `git` invocations.
//! - **State (`state`)**: per-repository records of how far provisioning got,
//!   so an interrupted run can be resumed instead of mistaken for done.
//! - **Orchestrator (`orchestrator`)**: ties the above together for each
//!   selected manifest entry.
//!
//! ## Execution Flow
//!
//! For each manifest entry, in order:
//!
//! 1.  **Select**: entries outside the `--repo` selection are skipped silently.
//! 2.  **Check**: already provisioned destinations are skipped.
//! 3.  **Clone** into `<root>/<repository>/<repository lowercased>`.
//! 4.  **Checkout** the pinned commit.
//! 5.  **Sync** submodules recursively.
//! 6.  **Patch** with the repository's patch set, if any.
//!
//! The first failing command ends the run.

pub mod config;
pub mod defaults;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod patches;
pub mod pipeline;
pub mod runner;
pub mod sizing;
pub mod state;

#[cfg(test)]
mod manifest_proptest;
