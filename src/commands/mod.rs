//! # CLI Command Implementations
//!
//! Each subcommand of `repo-provision` lives in its own file, with an `Args`
//! struct derived using `clap` and an `execute` function that calls into the
//! `repo_provision` library.
//!
//! [`ManifestArgs`] holds the options shared by every command that reads the
//! manifest.

pub mod build_args;
pub mod completions;
pub mod provision;
pub mod status;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{self, PathBuf};

use repo_provision::config::Selection;
use repo_provision::defaults;

/// Where the manifest, patches and destination tree live, and which entries
/// to consider.
#[derive(Args, Debug, Clone, Default)]
pub struct ManifestArgs {
    /// Destination root for provisioned repositories [default: current directory]
    #[arg(long, value_name = "DIR", env = "REPO_PROVISION_ROOT")]
    pub root: Option<PathBuf>,

    /// Manifest of `<organization> <repository> <commit>` lines [default: <root>/git-repos.txt]
    #[arg(short, long, value_name = "FILE", env = "REPO_PROVISION_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Directory holding one patch directory per repository [default: <root>/patches]
    #[arg(long, value_name = "DIR", env = "REPO_PROVISION_PATCHES")]
    pub patches: Option<PathBuf>,

    /// Only process the named repository. Can be passed multiple times.
    #[arg(long = "repo", value_name = "NAME")]
    pub repos: Vec<String>,
}

/// [`ManifestArgs`] with every default filled in and paths made absolute.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub patches: PathBuf,
}

impl ManifestArgs {
    pub fn resolve(&self) -> Result<ResolvedPaths> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let root = path::absolute(&root)
            .with_context(|| format!("Invalid root directory: {}", root.display()))?;

        let manifest = match &self.manifest {
            Some(manifest) => path::absolute(manifest)?,
            None => defaults::manifest_path(&root),
        };
        let patches = match &self.patches {
            Some(patches) => path::absolute(patches)?,
            None => defaults::patches_root(&root),
        };

        Ok(ResolvedPaths {
            root,
            manifest,
            patches,
        })
    }

    pub fn selection(&self) -> Selection {
        Selection::only(self.repos.iter().cloned())
    }
}
