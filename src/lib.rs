//! # Notes Tools
//!
//! Maintenance tooling for a repository of markdown notes that doubles as the
//! source of a documentation website. The directory tree is the data source:
//! directories are topics (titled by their `README.md`), markdown files are
//! notes, and `_img` folders hold each directory's images.
//!
//! # Architecture: Two Independent Pipelines
//!
//! ```text
//! A. Check     notes/  →  notes/ (in place)     conventions + last_modified stamps
//! B. Generate  notes/  →  _website/             docs, relocated images, sidebars.js
//! ```
//!
//! Pipeline A runs as a pre-commit hook: it validates directory titles and note
//! structure, then keeps each note's `last_modified` front matter current using
//! the git index and history. Pipeline B rebuilds the website docs from scratch
//! on every run. Both walk the same tree with [`walk::TreeWalker`] and abort at
//! the first error.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`check`] | Pipeline A: title and structure rules, `last_modified` stamping |
//! | [`generate`] | Pipeline B: output cleaning, static copy, image relocation, doc writing |
//! | [`transform`] | Note → website doc conversion, one typed step at a time |
//! | [`links`] | Link and image rewriting over markdown source offsets |
//! | [`sidebar`] | Sidebar manifest mirroring the notes tree |
//! | [`front_matter`] | YAML front matter split, ordered attributes, note/doc schemas |
//! | [`walk`] | Filtered, ordered traversal of the notes tree |
//! | [`vcs`] | Git index and history access behind a trait |
//! | [`config`] | `notes.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting of pipeline reports |
//!
//! # Design Decisions
//!
//! ## Git Behind a Trait
//!
//! Pipeline A needs the staged file list and per-file commit times. Both come
//! through [`vcs::VersionControl`], so the stamping rules are tested against a
//! mock without a repository or a `git` binary.
//!
//! ## Source-Preserving Link Rewrites
//!
//! Notes are rewritten by editing byte ranges of the original markdown found
//! with pulldown-cmark's offset iterator, never by re-rendering the document.
//! Tables, emphasis, and spacing the website understands pass through exactly
//! as written.

pub mod check;
pub mod config;
pub mod front_matter;
pub mod generate;
pub mod links;
pub mod output;
pub mod sidebar;
pub mod transform;
pub mod vcs;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
