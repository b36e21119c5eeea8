//! # Provisioning State Records
//!
//! A destination directory existing on disk says nothing about whether it
//! was fully provisioned: a run that dies after `clone` leaves a directory
//! behind that was never checked out, synced, or patched. To tell those
//! apart, each repository gets a small JSON record under
//! `<root>/.repo-provision/<repository>.json`. It is written at
//! [`Stage::Absent`] before the clone starts and advanced after every step
//! succeeds.
//!
//! Records are written atomically (temporary file, then rename), so a crash
//! leaves either the previous record or the new one.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::STATE_DIR_NAME;
use crate::error::{Error, Result};
use crate::manifest::ManifestEntry;

/// How far provisioning of a repository has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Absent,
    Cloned,
    Synced,
    Patched,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Absent => "absent",
            Stage::Cloned => "cloned",
            Stage::Synced => "synced",
            Stage::Patched => "patched",
            Stage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Persisted progress for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub organization: String,
    pub repository: String,
    pub commit: String,
    pub stage: Stage,
    /// File names of the patches applied (or to be applied), in order.
    #[serde(default)]
    pub patches: Vec<String>,
}

impl StateRecord {
    pub fn new(entry: &ManifestEntry, stage: Stage) -> Self {
        Self {
            organization: entry.organization.clone(),
            repository: entry.repository.clone(),
            commit: entry.commit.clone(),
            stage,
            patches: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Complete
    }
}

/// Directory of state records for one destination root.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// The store for `root`, i.e. `<root>/.repo-provision`.
    pub fn for_root(root: &Path) -> Self {
        Self {
            dir: root.join(STATE_DIR_NAME),
        }
    }

    pub fn record_path(&self, repository: &str) -> PathBuf {
        self.dir.join(format!("{}.json", repository))
    }

    /// Load the record for `repository`, or `None` if it has never been
    /// written.
    pub fn load(&self, repository: &str) -> Result<Option<StateRecord>> {
        let path = self.record_path(repository);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::StateRecord {
                    path,
                    message: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::StateRecord {
                path,
                message: e.to_string(),
            })
    }

    /// Write `record`, replacing any previous one.
    pub fn save(&self, record: &StateRecord) -> Result<()> {
        let path = self.record_path(&record.repository);
        let to_error = |message: String| Error::StateRecord {
            path: path.clone(),
            message,
        };

        fs::create_dir_all(&self.dir).map_err(|e| to_error(e.to_string()))?;

        let json = serde_json::to_string_pretty(record).map_err(|e| to_error(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| to_error(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| to_error(e.to_string()))?;
        Ok(())
    }
}
