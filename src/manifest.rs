//! # Manifest Reader
//!
//! Parses the repository manifest: UTF-8 text with one
//! `<organization> <repository> <pinned-commit>` triple per line, fields
//! separated by arbitrary whitespace. Blank lines are ignored.
//!
//! Parsing is lazy. [`Entries`] yields one result per non-blank line in file
//! order, so a malformed line surfaces as [`Error::MalformedEntry`] without
//! stopping iteration; the caller decides to report it and move on. I/O
//! failures while reading are yielded as [`Error::Io`] and are not
//! recoverable.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One `(organization, repository, commit)` triple from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub organization: String,
    pub repository: String,
    pub commit: String,
}

impl ManifestEntry {
    /// Parses a single manifest line.
    ///
    /// Returns `None` unless the line splits into exactly three tokens.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let organization = tokens.next()?;
        let repository = tokens.next()?;
        let commit = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }

        Some(Self {
            organization: organization.to_string(),
            repository: repository.to_string(),
            commit: commit.to_string(),
        })
    }

    /// On-disk location of this repository: `<root>/<repository>/<repository lowercased>`.
    pub fn destination(&self, root: &Path) -> PathBuf {
        root.join(&self.repository)
            .join(self.repository.to_lowercase())
    }

    /// `organization/repository`, as shown in progress output.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.organization, self.repository)
    }
}

/// Lazy iterator over the parse results of a manifest source.
pub struct Entries<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: BufRead> Iterator for Entries<R> {
    type Item = Result<ManifestEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::Io(e))),
            };
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(ManifestEntry::parse_line(trimmed).ok_or_else(|| {
                Error::MalformedEntry {
                    line_number: self.line_number,
                    line: trimmed.to_string(),
                }
            }));
        }
    }
}

/// Parse manifest entries from any buffered reader.
pub fn entries<R: BufRead>(reader: R) -> Entries<R> {
    Entries {
        lines: reader.lines(),
        line_number: 0,
    }
}

/// Open a manifest file and parse it lazily.
///
/// Failing to open the file is fatal and reported with its path.
pub fn from_file(path: &Path) -> Result<Entries<BufReader<File>>> {
    let file = File::open(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries(BufReader::new(file)))
}

/// Parse a manifest held in memory.
pub fn parse(content: &str) -> Entries<&[u8]> {
    entries(content.as_bytes())
}
