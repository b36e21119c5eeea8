//! # Provisioning Configuration
//!
//! [`ProvisionConfig`] gathers everything a run needs (destination root,
//! patches root, remote, git executable, idempotency mode, selection) into
//! one explicit value handed to the orchestrator. Nothing is discovered from
//! process-wide state once the config is built.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::pipeline::GitCommands;

/// How the orchestrator decides an entry is already provisioned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdempotencyMode {
    /// Consult the state record; resume entries that stopped part-way.
    #[default]
    Tracked,
    /// The destination directory existing is enough to skip the entry.
    LegacyExistence,
}

/// Optional restriction of a run to a set of repository names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    names: Option<BTreeSet<String>>,
}

impl Selection {
    /// Selects every entry.
    pub fn all() -> Self {
        Self { names: None }
    }

    /// Selects only the given repositories. An empty list selects everything,
    /// matching a command line with no `--repo` flags.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::all()
        } else {
            Self { names: Some(names) }
        }
    }

    pub fn is_all(&self) -> bool {
        self.names.is_none()
    }

    pub fn contains(&self, repository: &str) -> bool {
        match &self.names {
            Some(names) => names.contains(repository),
            None => true,
        }
    }

    /// The requested names, if a filter is active.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().flatten().map(String::as_str)
    }
}

/// Everything one provisioning run needs.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub root: PathBuf,
    pub patches_root: PathBuf,
    pub remote_base: String,
    pub git_program: OsString,
    pub idempotency: IdempotencyMode,
    pub selection: Selection,
    pub dry_run: bool,
}

impl ProvisionConfig {
    /// Config rooted at `root` with every other setting at its default.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            patches_root: defaults::patches_root(&root),
            root,
            remote_base: defaults::REMOTE_BASE.to_string(),
            git_program: OsString::from(defaults::GIT_PROGRAM),
            idempotency: IdempotencyMode::default(),
            selection: Selection::all(),
            dry_run: false,
        }
    }

    pub fn with_patches_root(mut self, patches_root: impl Into<PathBuf>) -> Self {
        self.patches_root = patches_root.into();
        self
    }

    pub fn with_remote_base(mut self, remote_base: impl Into<String>) -> Self {
        self.remote_base = remote_base.into();
        self
    }

    pub fn with_git_program(mut self, program: impl Into<OsString>) -> Self {
        self.git_program = program.into();
        self
    }

    pub fn with_idempotency(mut self, mode: IdempotencyMode) -> Self {
        self.idempotency = mode;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_commands(&self) -> GitCommands {
        GitCommands::new(self.git_program.clone(), self.remote_base.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_all_contains_everything() {
        let selection = Selection::all();
        assert!(selection.is_all());
        assert!(selection.contains("anything"));
        assert_eq!(selection.names().count(), 0);
    }

    #[test]
    fn test_selection_only() {
        let selection = Selection::only(["repoB"]);
        assert!(!selection.is_all());
        assert!(selection.contains("repoB"));
        assert!(!selection.contains("repoA"));
    }

    #[test]
    fn test_selection_is_case_sensitive() {
        let selection = Selection::only(["RepoB"]);
        assert!(!selection.contains("repob"));
    }

    #[test]
    fn test_empty_selection_means_all() {
        let selection = Selection::only(Vec::<String>::new());
        assert!(selection.is_all());
    }

    #[test]
    fn test_selection_names_sorted_and_deduplicated() {
        let selection = Selection::only(["b", "a", "b"]);
        assert_eq!(selection.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_config_defaults() {
        let config = ProvisionConfig::new("/work");
        assert_eq!(config.root(), Path::new("/work"));
        assert_eq!(config.patches_root, PathBuf::from("/work/patches"));
        assert_eq!(config.remote_base, "https://github.com");
        assert_eq!(config.git_program, OsString::from("git"));
        assert_eq!(config.idempotency, IdempotencyMode::Tracked);
        assert!(config.selection.is_all());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_builders() {
        let config = ProvisionConfig::new("/work")
            .with_patches_root("/elsewhere/patches")
            .with_remote_base("file:///mirror")
            .with_git_program("/opt/git")
            .with_idempotency(IdempotencyMode::LegacyExistence)
            .with_selection(Selection::only(["repoA"]))
            .with_dry_run(true);

        assert_eq!(config.patches_root, PathBuf::from("/elsewhere/patches"));
        assert_eq!(config.idempotency, IdempotencyMode::LegacyExistence);
        assert!(config.dry_run);
        assert!(config.selection.contains("repoA"));
    }
}
