//! Shared test utilities for the notes-tools test suite.
//!
//! Provides fixture setup, small writers for building ad-hoc note trees, and
//! extractors that turn reports into plain tuples for assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! write_readme(tmp.path(), "Tools/Git", "Git");
//!
//! let doc = read_note(tmp.path(), "Tools/Git/branches.md");
//! assert_eq!(doc.attributes.get("description"), Some("Creating and deleting branches"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::check::CheckReport;
use crate::front_matter::{self, Document};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/notes/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/notes");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Tree builders
// =========================================================================

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_note(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Write a directory README with the tree tool's layout: a two-line preamble
/// followed by the `# title` line.
pub fn write_readme(root: &Path, rel_dir: &str, title: &str) {
    write_note(
        root,
        &format!("{rel_dir}/README.md"),
        &format!("<!-- Maintained by the tree tool; edit the title only. -->\n\n# {title}\n"),
    );
}

// =========================================================================
// Readers and extractors
// =========================================================================

/// Read and split a note. Panics with the path on failure.
pub fn read_note(root: &Path, rel: &str) -> Document {
    let content = std::fs::read_to_string(root.join(rel))
        .unwrap_or_else(|e| panic!("cannot read note '{rel}': {e}"));
    front_matter::parse(&content).unwrap_or_else(|e| panic!("bad front matter in '{rel}': {e}"))
}

/// `(path, title)` of every directory a check run visited.
pub fn directory_titles(report: &CheckReport) -> Vec<(&str, &str)> {
    report
        .directories
        .iter()
        .map(|d| (d.path.as_str(), d.title.as_str()))
        .collect()
}
