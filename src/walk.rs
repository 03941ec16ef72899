//! Notes tree walking shared by both pipelines.
//!
//! A [`TreeWalker`] decides which directories and files of the notes tree are
//! part of the content:
//!
//! - directories are skipped when their name starts with `.` or `_` (hidden
//!   folders, `_img`, `_website`) or is listed in `notes.ignored_dirs`
//! - files are kept when the walker's file predicate accepts their name
//!
//! Paths handed to callers are relative to the walker root. Use
//! [`relative_id`] to turn them into the forward-slash form used for staged
//! paths, sidebar ids and output locations.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File name of the per-directory description file.
pub const README: &str = "README.md";

/// Sibling ordering at each level of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrder {
    /// Plain file-name order.
    ByName,
    /// Files first, then directories, each group by name.
    FilesFirst,
}

/// An included entry, with its path relative to the walker root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Directory(PathBuf),
    File(PathBuf),
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::Directory(p) | Entry::File(p) => p,
        }
    }
}

pub struct TreeWalker<'a> {
    root: &'a Path,
    ignored_dirs: &'a [String],
    include_file: fn(&str) -> bool,
    order: EntryOrder,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        root: &'a Path,
        ignored_dirs: &'a [String],
        include_file: fn(&str) -> bool,
        order: EntryOrder,
    ) -> Self {
        Self {
            root,
            ignored_dirs,
            include_file,
            order,
        }
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    /// Whether a directory name belongs to the notes tree.
    pub fn include_dir(&self, name: &str) -> bool {
        !(name.starts_with('.')
            || name.starts_with('_')
            || self.ignored_dirs.iter().any(|d| d == name))
    }

    /// Visit every included entry below the root, depth first.
    ///
    /// The root itself is not visited. A directory is visited before its
    /// contents; excluded directories are not descended into.
    pub fn walk<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        E: From<walkdir::Error>,
        F: FnMut(&Entry) -> Result<(), E>,
    {
        let order = self.order;
        let entries = WalkDir::new(self.root)
            .min_depth(1)
            .sort_by(move |a, b| compare(order, a, b))
            .into_iter()
            .filter_entry(|e| self.accepts(e));

        for dent in entries {
            let dent = dent?;
            let rel = self.relative(dent.path());
            let entry = if dent.file_type().is_dir() {
                Entry::Directory(rel)
            } else {
                Entry::File(rel)
            };
            visit(&entry)?;
        }
        Ok(())
    }

    /// List the included entries directly inside `rel_dir`.
    pub fn children(&self, rel_dir: &Path) -> std::io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for dent in fs::read_dir(self.root.join(rel_dir))? {
            let dent = dent?;
            let name = dent.file_name().to_string_lossy().to_string();
            let rel = rel_dir.join(&name);
            if dent.file_type()?.is_dir() {
                if self.include_dir(&name) {
                    entries.push(Entry::Directory(rel));
                }
            } else if (self.include_file)(&name) {
                entries.push(Entry::File(rel));
            }
        }
        entries.sort_by(|a, b| {
            let key = |e: &Entry| {
                (
                    self.order == EntryOrder::FilesFirst && matches!(e, Entry::Directory(_)),
                    e.path().file_name().map(|n| n.to_os_string()),
                )
            };
            key(a).cmp(&key(b))
        });
        Ok(entries)
    }

    fn accepts(&self, dent: &DirEntry) -> bool {
        if dent.depth() == 0 {
            return true;
        }
        let name = dent.file_name().to_string_lossy();
        if dent.file_type().is_dir() {
            self.include_dir(&name)
        } else {
            (self.include_file)(&name)
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root).unwrap_or(path).to_path_buf()
    }
}

fn compare(order: EntryOrder, a: &DirEntry, b: &DirEntry) -> Ordering {
    match order {
        EntryOrder::ByName => a.file_name().cmp(b.file_name()),
        EntryOrder::FilesFirst => (a.file_type().is_dir(), a.file_name())
            .cmp(&(b.file_type().is_dir(), b.file_name())),
    }
}

/// Markdown notes: every `.md` file except directory READMEs.
pub fn is_note_file(name: &str) -> bool {
    name.ends_with(".md") && name != README
}

/// Forward-slash form of a relative path (`Tools\Git\a.md` → `Tools/Git/a.md`).
pub fn relative_id(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "/")
}
