//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest(manifests::TWO_REPOS);
//!     fixture.command().assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Manifest snippets used across tests.
#[allow(dead_code)]
pub mod manifests {
    /// Two well-formed entries.
    pub const TWO_REPOS: &str = "acme repoA abc123\nacme repoB def456\n";

    /// Well-formed entries around malformed ones and blank lines.
    pub const WITH_MALFORMED: &str =
        "acme repoA abc123\n\nonly two\nacme repoB def456 extra\n\nacme repoC 789fed\n";
}

/// A temporary destination root with an optional manifest, patches and fake
/// `git`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `git-repos.txt` at the root.
    pub fn with_manifest(self, content: &str) -> Self {
        self.temp_dir
            .child("git-repos.txt")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// Add a patch file for `repository`.
    pub fn with_patch(self, repository: &str, name: &str) -> Self {
        self.temp_dir
            .child("patches")
            .child(repository)
            .child(name)
            .write_str("From 0000000000000000000000000000000000000000 Mon Sep 17 00:00:00 2001\n")
            .expect("Failed to write patch");
        self
    }

    /// Pretend `repository` has already been provisioned by creating its
    /// destination.
    pub fn with_existing(self, repository: &str) -> Self {
        self.temp_dir
            .child(repository)
            .child(repository.to_lowercase())
            .create_dir_all()
            .expect("Failed to create destination");
        self
    }

    /// Write a raw state record for `repository`.
    pub fn with_record(self, repository: &str, json: &str) -> Self {
        self.temp_dir
            .child(".repo-provision")
            .child(format!("{}.json", repository))
            .write_str(json)
            .expect("Failed to write state record");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The root with symlinks resolved, as the binary sees it when it
    /// defaults to its working directory.
    pub fn canonical_path(&self) -> PathBuf {
        self.path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory")
    }

    /// Destination path for `repository` under this root.
    pub fn destination(&self, repository: &str) -> PathBuf {
        self.canonical_path()
            .join(repository)
            .join(repository.to_lowercase())
    }

    /// Create a command configured to run in this fixture's directory, with
    /// no inherited provisioning environment and colors off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-provision");
        cmd.current_dir(self.path())
            .env_remove("REPO_PROVISION_ROOT")
            .env_remove("REPO_PROVISION_MANIFEST")
            .env_remove("REPO_PROVISION_PATCHES")
            .env_remove("REPO_PROVISION_REMOTE")
            .env_remove("REPO_PROVISION_GIT")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A stand-in for `git` that logs every invocation as `<cwd>|<args>` and
/// creates the clone target, so provisioning runs without a network.
///
/// Like `git`, a failed `am` leaves `.git/rebase-apply` behind and further
/// `am` calls are refused until `am --abort` clears it.
#[cfg(unix)]
#[allow(dead_code)]
pub mod fake_git {
    use super::TestFixture;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    const SCRIPT: &str = r#"#!/bin/sh
printf '%s|%s\n' "$(pwd)" "$*" >> "$FAKE_GIT_LOG"
if [ "$1" = "am" ] && [ "$2" = "--abort" ]; then
  if [ ! -d .git/rebase-apply ]; then
    echo "fatal: Resolve operation not in progress, we are not resuming." >&2
    exit 128
  fi
  rm -rf .git/rebase-apply
  exit 0
fi
if [ "$1" = "am" ] && [ -d .git/rebase-apply ]; then
  echo "fatal: previous rebase directory .git/rebase-apply still exists but mbox given." >&2
  exit 128
fi
if [ -n "$FAKE_GIT_FAIL" ] && [ "$1" = "$FAKE_GIT_FAIL" ]; then
  echo "fake git: $1 failed" >&2
  if [ "$1" = "am" ]; then
    mkdir -p .git/rebase-apply
  fi
  exit 7
fi
if [ "$1" = "clone" ]; then
  mkdir -p "$3"
fi
exit 0
"#;

    /// Paths of an installed fake git.
    pub struct FakeGit {
        pub program: PathBuf,
        pub log: PathBuf,
    }

    impl FakeGit {
        /// Install the script in a `bin/` directory next to the fixture root.
        pub fn install(fixture: &TestFixture) -> Self {
            let bin = fixture.path().join(".bin");
            fs::create_dir_all(&bin).unwrap();
            let program = bin.join("git");
            fs::write(&program, SCRIPT).unwrap();
            fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
            Self {
                program,
                log: bin.join("git.log"),
            }
        }

        /// A provisioning command wired to this fake.
        pub fn command(&self, fixture: &TestFixture) -> assert_cmd::Command {
            let mut cmd = fixture.command();
            cmd.env("REPO_PROVISION_GIT", &self.program)
                .env("FAKE_GIT_LOG", &self.log)
                .env_remove("FAKE_GIT_FAIL");
            cmd
        }

        /// Logged invocations as `(cwd, args)`.
        pub fn calls(&self) -> Vec<(String, String)> {
            match fs::read_to_string(&self.log) {
                Ok(content) => content
                    .lines()
                    .map(|line| {
                        let (cwd, args) = line.split_once('|').unwrap();
                        (cwd.to_string(), args.to_string())
                    })
                    .collect(),
                Err(_) => Vec::new(),
            }
        }

        /// Logged argument strings only.
        pub fn args(&self) -> Vec<String> {
            self.calls().into_iter().map(|(_, args)| args).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_manifest() {
        let fixture = TestFixture::new().with_manifest(manifests::TWO_REPOS);
        assert!(fixture.path().join("git-repos.txt").exists());
    }

    #[test]
    fn test_fixture_with_existing() {
        let fixture = TestFixture::new().with_existing("RepoA");
        assert!(fixture.path().join("RepoA/repoa").is_dir());
    }
}
