//! CLI output formatting for both pipelines.
//!
//! # Information-First Display
//!
//! Output leads with what a reader of the notes cares about (directory
//! titles, note paths, doc ids) and shows mechanics such as timestamp sources
//! or output locations as indented context lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Directories
//!     Tools → Tools & Utilities
//!     Tools/Git → Git Version Control
//!
//! Stamped
//!     Tools/Git/branches.md
//!         last_modified: 2023-01-02T03:04:05.000Z (last commit)
//!
//! Checked 2 directories, 3 notes, stamped 1
//! ```
//!
//! ## Generate
//!
//! ```text
//! Docs
//!     welcome.md
//!     Tools/shell.md → tools/shell.md
//!
//! Copied 2 static files, 2 images
//! Sidebar: 3 categories → _website/sidebars.js
//! Generated 2 docs
//! ```
//!
//! # Architecture
//!
//! Each pipeline has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::check::{CheckReport, StampAction};
use crate::generate::GenerateReport;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 note`, `3 notes`.
fn count_of(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn stamp_source(action: StampAction) -> &'static str {
    match action {
        StampAction::Keep => "kept",
        StampAction::Now => "staged",
        StampAction::LastCommit => "last commit",
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of a successful check run.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.directories.is_empty() {
        lines.push("Directories".to_string());
        for dir in &report.directories {
            lines.push(format!("{}{} \u{2192} {}", indent(1), dir.path, dir.title));
        }
        lines.push(String::new());
    }

    if !report.stamped.is_empty() {
        lines.push("Stamped".to_string());
        for note in &report.stamped {
            lines.push(format!("{}{}", indent(1), note.path));
            lines.push(format!(
                "{}last_modified: {} ({})",
                indent(2),
                note.timestamp,
                stamp_source(note.action)
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Checked {}, {}, stamped {}",
        count_of(report.directories.len(), "directory", "directories"),
        count_of(report.notes_checked, "note", "notes"),
        report.stamped.len()
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format the result of a generate run. `root` is stripped from the sidebar
/// path so the summary reads relative to the repository.
pub fn format_generate_output(report: &GenerateReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.docs.is_empty() {
        lines.push("Docs".to_string());
        for doc in &report.docs {
            if doc.source == doc.output {
                lines.push(format!("{}{}", indent(1), doc.source));
            } else {
                lines.push(format!(
                    "{}{} \u{2192} {}",
                    indent(1),
                    doc.source,
                    doc.output
                ));
            }
        }
        lines.push(String::new());
    }

    let sidebar = report
        .sidebar_path
        .strip_prefix(root)
        .unwrap_or(&report.sidebar_path);
    lines.push(format!(
        "Copied {}, {}",
        count_of(report.static_files, "static file", "static files"),
        count_of(report.images, "image", "images")
    ));
    lines.push(format!(
        "Sidebar: {} \u{2192} {}",
        count_of(report.sidebar_categories, "category", "categories"),
        sidebar.display()
    ));
    lines.push(format!("Generated {}", count_of(report.docs.len(), "doc", "docs")));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport, root: &Path) {
    for line in format_generate_output(report, root) {
        println!("{}", line);
    }
}
