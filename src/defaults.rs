//! Default values for repo-provision configuration.
//!
//! Every default here is relative to the destination root, which itself
//! defaults to the current directory. Each can be overridden by a CLI flag
//! or its environment variable.

use std::path::{Path, PathBuf};

/// Manifest file name inside the root.
pub const MANIFEST_FILE_NAME: &str = "git-repos.txt";

/// Patches directory name inside the root.
pub const PATCHES_DIR_NAME: &str = "patches";

/// Directory holding per-repository state records.
pub const STATE_DIR_NAME: &str = ".repo-provision";

/// Base URL that `<organization>/<repository>.git` is appended to.
pub const REMOTE_BASE: &str = "https://github.com";

/// Version-control executable.
pub const GIT_PROGRAM: &str = "git";

/// Default manifest path for `root`.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE_NAME)
}

/// Default patches root for `root`.
pub fn patches_root(root: &Path) -> PathBuf {
    root.join(PATCHES_DIR_NAME)
}
