//! Version-control queries used by the pre-commit check.
//!
//! The [`VersionControl`] trait covers the two questions the check asks of
//! history: which paths are staged, and when a path was last committed. The
//! production implementation is [`Git`], which shells out to the `git`
//! binary in the notes root.
//!
//! Paths are exchanged relative to the notes root, which may be a
//! subdirectory of the repository: the staged listing is limited to that
//! directory and reported relative to it, and history lookups take pathspecs
//! relative to it.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("IO error running git: {0}")]
    Io(#[from] std::io::Error),
    #[error("`git {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
    #[error("unreadable commit time '{value}' for {path}: {source}")]
    BadTimestamp {
        path: String,
        value: String,
        source: chrono::ParseError,
    },
}

/// Root-relative, forward-slash paths staged for the next commit.
///
/// Read once per run and never refreshed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedFiles(BTreeSet<String>);

impl StagedFiles {
    /// Parse NUL-separated `git diff --name-only -z` output. Names are taken
    /// verbatim.
    pub fn from_listing(listing: &str) -> Self {
        Self(
            listing
                .split('\0')
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub trait VersionControl {
    /// Paths currently staged in the index.
    fn staged_files(&self, root: &Path) -> Result<StagedFiles, VcsError>;

    /// ISO-8601 time of the last commit touching `path`, or `None` if the path
    /// has no history.
    fn last_commit_time(&self, root: &Path, path: &str) -> Result<Option<String>, VcsError>;
}

/// [`VersionControl`] backed by the `git` command line.
#[derive(Debug, Default)]
pub struct Git;

impl Git {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, root: &Path, args: &[&str]) -> Result<String, VcsError> {
        let output = Command::new("git").current_dir(root).args(args).output()?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn has_commits(&self, root: &Path) -> bool {
        self.run(root, &["rev-parse", "--verify", "-q", "HEAD"]).is_ok()
    }
}

impl VersionControl for Git {
    fn staged_files(&self, root: &Path) -> Result<StagedFiles, VcsError> {
        let listing = self.run(
            root,
            &[
                "-c",
                "core.quotePath=false",
                "diff",
                "--name-only",
                "--cached",
                "--relative",
                "-z",
            ],
        )?;
        Ok(StagedFiles::from_listing(&listing))
    }

    fn last_commit_time(&self, root: &Path, path: &str) -> Result<Option<String>, VcsError> {
        let out = match self.run(root, &["log", "-1", "--format=%cI", "--", path]) {
            Ok(out) => out,
            // `git log` fails outright before the first commit
            Err(VcsError::CommandFailed { .. }) if !self.has_commits(root) => return Ok(None),
            Err(e) => return Err(e),
        };
        let value = out.trim();
        if value.is_empty() {
            return Ok(None);
        }
        let parsed =
            DateTime::parse_from_rfc3339(value).map_err(|source| VcsError::BadTimestamp {
                path: path.to_string(),
                value: value.to_string(),
                source,
            })?;
        Ok(Some(iso_timestamp(parsed.with_timezone(&Utc))))
    }
}

/// Format an instant the way `last_modified` stores it:
/// UTC, millisecond precision, `Z` suffix.
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
