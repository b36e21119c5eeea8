//! # Patch Locator
//!
//! Patches for a repository live under `<patches_root>/<repository>/`. Every
//! regular file directly inside that directory is a patch; they are applied
//! in filename order, so authors number them (`0001-fix.patch`,
//! `0002-feat.patch`, ...).
//!
//! A missing directory is not an error. It means the repository needs no
//! patches.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;

/// Ordered patch files for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    paths: Vec<PathBuf>,
}

impl PatchSet {
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// File names only, in application order. Used for state records.
    pub fn file_names(&self) -> Vec<String> {
        self.paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }
}

/// Find the patches for `repository` under `patches_root`.
pub fn locate(patches_root: &Path, repository: &str) -> Result<PatchSet> {
    // `git am` runs inside the destination, so paths must not be relative.
    let dir = std::path::absolute(patches_root.join(repository))?;

    let read_dir = match fs::read_dir(&dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PatchSet::default()),
        Err(e) if e.kind() == io::ErrorKind::NotADirectory => return Ok(PatchSet::default()),
        Err(e) => return Err(e.into()),
    };

    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            debug!("ignoring directory in patch set: {}", path.display());
            continue;
        }
        paths.push(path);
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(PatchSet { paths })
}
