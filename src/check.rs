//! Pre-commit check and normalization of the notes tree.
//!
//! Walks every note directory and note file, in name order, and stops at the
//! first violation:
//!
//! | Entry | Rule |
//! |-------|------|
//! | directory | `README.md` line 3 is `# <title>` and the title is not the folder name |
//! | note | has a `## Contents` line |
//! | note | no loose bullet list (items separated by a blank line) |
//!
//! Passing notes then get their `last_modified` front matter maintained:
//!
//! | staged? | has `last_modified`? | action |
//! |---------|----------------------|--------|
//! | no | yes | keep |
//! | yes | any | set to now |
//! | no | no | set to the last commit time (now if never committed) |
//!
//! Rewritten notes are not re-staged; the stamp of a staged note lands in the
//! working tree and is picked up by the next `git add`.

use crate::config::NotesConfig;
use crate::front_matter::{self, FrontMatterError};
use crate::vcs::{self, StagedFiles, VcsError, VersionControl};
use crate::walk::{self, Entry, EntryOrder, TreeWalker};
use chrono::Utc;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

pub const CONTENTS_HEADING: &str = "## Contents";
pub const LAST_MODIFIED: &str = "last_modified";

/// Zero-based line of a directory README that holds its title. READMEs are
/// written by the tree tool with a fixed two-line preamble.
const README_TITLE_LINE: usize = 2;

static LOOSE_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*- [^\r\n]+\r?\n[ \t]*\r?\n[ \t]*- ").expect("valid regex"));

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Vcs(#[from] VcsError),
    #[error("{path}: {source}")]
    FrontMatter {
        path: String,
        source: FrontMatterError,
    },
    #[error("{path}: {rule}")]
    Rule { path: String, rule: Rule },
}

/// A structural convention a directory or note breaks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    #[error("directory has no README.md")]
    MissingReadme,
    #[error("README.md has no '# ' title on line 3")]
    MissingTitle,
    #[error("README.md title '{0}' is just the folder name; give the directory a custom title")]
    DefaultTitle(String),
    #[error("missing '## Contents' heading")]
    MissingContents,
    #[error("loose list, remove the blank line between items: {0:?}")]
    LooseList(String),
}

/// What the stamper does with a note's `last_modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampAction {
    Keep,
    Now,
    LastCommit,
}

pub fn stamp_action(staged: bool, has_last_modified: bool) -> StampAction {
    match (staged, has_last_modified) {
        (true, _) => StampAction::Now,
        (false, true) => StampAction::Keep,
        (false, false) => StampAction::LastCommit,
    }
}

/// Everything a check run reads once up front.
pub struct CheckContext<'a> {
    pub root: &'a Path,
    pub config: &'a NotesConfig,
    pub vcs: &'a dyn VersionControl,
    pub staged: StagedFiles,
    /// The run's "now", already formatted as a `last_modified` value.
    pub now: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTitle {
    pub path: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampedNote {
    pub path: String,
    pub action: StampAction,
    pub timestamp: String,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub directories: Vec<DirectoryTitle>,
    pub notes_checked: usize,
    pub stamped: Vec<StampedNote>,
}

/// Run the check on the repository at `root`.
pub fn check(
    root: &Path,
    config: &NotesConfig,
    vcs: &dyn VersionControl,
) -> Result<CheckReport, CheckError> {
    let ctx = CheckContext {
        root,
        config,
        vcs,
        staged: vcs.staged_files(root)?,
        now: vcs::iso_timestamp(Utc::now()),
    };
    check_with_context(&ctx)
}

pub fn check_with_context(ctx: &CheckContext) -> Result<CheckReport, CheckError> {
    let walker = TreeWalker::new(
        ctx.root,
        &ctx.config.notes.ignored_dirs,
        walk::is_note_file,
        EntryOrder::ByName,
    );
    let mut report = CheckReport::default();

    walker.walk(|entry| -> Result<(), CheckError> {
        let rel = walk::relative_id(entry.path());
        match entry {
            Entry::Directory(dir) => {
                let title = check_directory(&ctx.root.join(dir), &rel)?;
                report.directories.push(DirectoryTitle { path: rel, title });
            }
            Entry::File(file) => {
                if let Some(stamped) = check_note_file(ctx, &ctx.root.join(file), rel)? {
                    report.stamped.push(stamped);
                }
                report.notes_checked += 1;
            }
        }
        Ok(())
    })?;

    Ok(report)
}

/// Read a directory's README and return its custom title.
fn check_directory(dir: &Path, rel: &str) -> Result<String, CheckError> {
    let broken = |rule| CheckError::Rule {
        path: rel.to_string(),
        rule,
    };
    let content = match fs::read_to_string(dir.join(walk::README)) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(broken(Rule::MissingReadme)),
        Err(e) => return Err(e.into()),
    };
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    directory_title(&content, &dir_name).map_err(broken)
}

/// Extract the custom title from a directory README.
pub fn directory_title(readme: &str, dir_name: &str) -> Result<String, Rule> {
    let title = readme
        .lines()
        .nth(README_TITLE_LINE)
        .and_then(|line| line.strip_prefix("# "))
        .map(str::trim_end)
        .ok_or(Rule::MissingTitle)?;
    if title == dir_name {
        return Err(Rule::DefaultTitle(title.to_string()));
    }
    Ok(title.to_string())
}

/// Structural rules every note must satisfy.
pub fn validate_note(content: &str) -> Result<(), Rule> {
    if !content.lines().any(|line| line.trim_end() == CONTENTS_HEADING) {
        return Err(Rule::MissingContents);
    }
    if let Some(m) = LOOSE_LIST.find(content) {
        return Err(Rule::LooseList(m.as_str().to_string()));
    }
    Ok(())
}

fn check_note_file(
    ctx: &CheckContext,
    path: &Path,
    rel: String,
) -> Result<Option<StampedNote>, CheckError> {
    let content = fs::read_to_string(path)?;
    validate_note(&content).map_err(|rule| CheckError::Rule {
        path: rel.clone(),
        rule,
    })?;

    match stamp_last_modified(ctx, &content, rel)? {
        Some((stamped, rewritten)) => {
            fs::write(path, rewritten)?;
            Ok(Some(stamped))
        }
        None => Ok(None),
    }
}

/// Decide and apply the `last_modified` update for one note.
///
/// Returns the new file content, or `None` when the note is left alone.
fn stamp_last_modified(
    ctx: &CheckContext,
    content: &str,
    rel: String,
) -> Result<Option<(StampedNote, String)>, CheckError> {
    let front_matter_error = |source| CheckError::FrontMatter {
        path: rel.clone(),
        source,
    };
    let mut doc = front_matter::parse(content).map_err(front_matter_error)?;
    let action = stamp_action(
        ctx.staged.contains(&rel),
        doc.attributes.contains_key(LAST_MODIFIED),
    );
    let timestamp = match action {
        StampAction::Keep => return Ok(None),
        StampAction::Now => ctx.now.clone(),
        StampAction::LastCommit => ctx
            .vcs
            .last_commit_time(ctx.root, &rel)?
            .unwrap_or_else(|| ctx.now.clone()),
    };
    doc.attributes.set(LAST_MODIFIED, timestamp.clone());
    let rewritten = front_matter::render(&doc.attributes, &doc.body).map_err(front_matter_error)?;
    Ok(Some((
        StampedNote {
            path: rel,
            action,
            timestamp,
        },
        rewritten,
    )))
}
