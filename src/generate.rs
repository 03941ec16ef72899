//! Website docs generation.
//!
//! Rebuilds the website's docs from the notes tree in one pass:
//!
//! 1. delete the previously generated docs and image directories
//! 2. copy `docs-static` verbatim into the docs directory
//! 3. build the sidebar manifest ([`crate::sidebar`])
//! 4. walk the notes (files before directories at each level):
//!    - each directory's `_img` folder is copied into the image tree
//!    - each note is converted ([`crate::transform`]) and written to the docs
//! 5. write the sidebar manifest
//!
//! ## Output Structure
//!
//! ```text
//! _website/
//! ├── docs/                          # deleted and rebuilt
//! │   ├── about/introduction.md      # from docs-static/
//! │   ├── welcome.md
//! │   └── tools/
//! │       ├── shell.md
//! │       └── git/branches.md
//! ├── static/img/from-notes/         # deleted and rebuilt
//! │   └── tools/git/graph.png        # from Tools/Git/_img/Graph.PNG
//! └── sidebars.js
//! ```
//!
//! Generated paths are lower-cased so doc ids, links and image URLs agree no
//! matter how the notes are capitalized.

use crate::config::NotesConfig;
use crate::links::LinkRewriter;
use crate::sidebar::{self, SidebarError};
use crate::transform::{self, TransformError};
use crate::walk::{self, Entry, EntryOrder, TreeWalker};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("static docs directory not found: {0}")]
    MissingStaticDocs(PathBuf),
    #[error("{path}: {source}")]
    Transform {
        path: String,
        source: TransformError,
    },
    #[error(transparent)]
    Sidebar(#[from] SidebarError),
}

/// A note written to the docs directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDoc {
    /// Note path relative to the notes root.
    pub source: String,
    /// Written path relative to the docs directory.
    pub output: String,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub static_files: usize,
    pub docs: Vec<GeneratedDoc>,
    pub images: usize,
    pub sidebar_categories: usize,
    pub sidebar_path: PathBuf,
}

/// Regenerate the website docs for the repository at `root`.
pub fn generate(root: &Path, config: &NotesConfig) -> Result<GenerateReport, GenerateError> {
    let docs_dir = config.website.docs_path(root);
    let images_dir = config.website.images_path(root);
    let static_dir = config.website.docs_static_path(root);

    clean_outputs(&[&docs_dir, &images_dir])?;

    if !static_dir.is_dir() {
        return Err(GenerateError::MissingStaticDocs(static_dir));
    }
    let mut report = GenerateReport {
        static_files: copy_tree(&static_dir, &docs_dir, false)?,
        ..GenerateReport::default()
    };

    let walker = TreeWalker::new(
        root,
        &config.notes.ignored_dirs,
        walk::is_note_file,
        EntryOrder::FilesFirst,
    );

    let sidebars = sidebar::build_sidebar(&walker, &config.sidebar)?;

    report.images += relocate_images(root, Path::new(""), &config.notes.image_dir, &images_dir)?;
    walker.walk(|entry| -> Result<(), GenerateError> {
        match entry {
            Entry::Directory(dir) => {
                report.images += relocate_images(root, dir, &config.notes.image_dir, &images_dir)?;
            }
            Entry::File(file) => {
                report.docs.push(write_doc(root, file, &docs_dir, config)?);
            }
        }
        Ok(())
    })?;

    report.sidebar_categories = sidebars.category_count();
    report.sidebar_path = config.website.sidebar_path(root);
    if let Some(parent) = report.sidebar_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&report.sidebar_path, sidebars.to_module()?)?;

    Ok(report)
}

/// Delete generated output directories that exist.
pub fn clean_outputs(dirs: &[&Path]) -> std::io::Result<()> {
    for dir in dirs {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
    }
    Ok(())
}

/// Recursively copy `src` into `dst`, returning the number of files copied.
///
/// With `lowercase`, every path below `dst` is lower-cased.
pub fn copy_tree(src: &Path, dst: &Path, lowercase: bool) -> Result<usize, GenerateError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let rel = if lowercase {
            PathBuf::from(walk::relative_id(rel).to_lowercase())
        } else {
            rel.to_path_buf()
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy a notes directory's image folder into the image tree.
///
/// `Tools/Git/_img/Graph.PNG` lands at `<images>/tools/git/graph.png`; nested
/// folders are kept, lower-cased.
pub fn relocate_images(
    root: &Path,
    rel_dir: &Path,
    image_dir: &str,
    images_root: &Path,
) -> Result<usize, GenerateError> {
    let source = root.join(rel_dir).join(image_dir);
    if !source.is_dir() {
        return Ok(0);
    }
    let target = images_root.join(walk::relative_id(rel_dir).to_lowercase());
    copy_tree(&source, &target, true)
}

fn write_doc(
    root: &Path,
    rel: &Path,
    docs_dir: &Path,
    config: &NotesConfig,
) -> Result<GeneratedDoc, GenerateError> {
    let source = walk::relative_id(rel);
    let note_dir = rel.parent().map(walk::relative_id).unwrap_or_default();
    let rewriter = LinkRewriter {
        note_dir: &note_dir,
        images_url: &config.website.images_url,
        strip_md_extension: config.links.strip_md_extension,
    };

    let content = fs::read_to_string(root.join(rel))?;
    let doc = transform::transform_note(&content, &rewriter).map_err(|source_err| {
        GenerateError::Transform {
            path: source.clone(),
            source: source_err,
        }
    })?;

    let output = source.to_lowercase();
    let target = docs_dir.join(&output);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, doc)?;

    Ok(GeneratedDoc { source, output })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn fixtures_generate_docs_images_and_sidebar() {
        let tmp = setup_fixtures();
        let config = NotesConfig::default();

        let report = generate(tmp.path(), &config).unwrap();

        assert_eq!(
            report
                .docs
                .iter()
                .map(|d| d.output.as_str())
                .collect::<Vec<_>>(),
            vec!["welcome.md", "tools/shell.md", "tools/git/branches.md"]
        );
        assert_eq!(report.static_files, 2);
        assert_eq!(report.images, 2);
        assert_eq!(report.sidebar_categories, 3);

        let site = tmp.path().join("_website");
        assert!(site.join("docs/about/introduction.md").is_file());
        assert!(site.join("static/img/from-notes/tools/git/graph.png").is_file());
        assert!(
            site.join("static/img/from-notes/tools/git/diagrams/flow.png")
                .is_file()
        );
        assert!(site.join("sidebars.js").is_file());
    }

    #[test]
    fn generated_doc_has_site_front_matter() {
        let tmp = setup_fixtures();
        generate(tmp.path(), &NotesConfig::default()).unwrap();

        let branches =
            fs::read_to_string(tmp.path().join("_website/docs/tools/git/branches.md")).unwrap();
        assert!(branches.starts_with(
            "---\ntitle: Git Branches\ndescription: Creating and deleting branches\nsidebar_label: Branches\n---\n\nCreating and deleting branches\n\n## Creating\n"
        ));
        assert!(!branches.contains("## Contents"));
        assert!(branches.contains("![History graph](/img/from-notes/tools/git/graph.png)"));
        assert!(branches.contains("[shell notes](../shell)"));
        assert!(branches.contains(
            "<a href=\"https://git-scm.com/book\" target=\"_blank\" rel=\"nofollow noopener noreferrer\">Pro Git</a>"
        ));
    }

    #[test]
    fn previous_output_is_removed() {
        let tmp = setup_fixtures();
        let stale_doc = tmp.path().join("_website/docs/stale.md");
        let stale_img = tmp.path().join("_website/static/img/from-notes/stale.png");
        write_note(tmp.path(), "_website/docs/stale.md", "old");
        write_note(tmp.path(), "_website/static/img/from-notes/stale.png", "old");

        generate(tmp.path(), &NotesConfig::default()).unwrap();

        assert!(!stale_doc.exists());
        assert!(!stale_img.exists());
    }

    #[test]
    fn missing_static_docs_is_error() {
        let tmp = setup_fixtures();
        fs::remove_dir_all(tmp.path().join("_website/docs-static")).unwrap();
        let result = generate(tmp.path(), &NotesConfig::default());
        assert!(matches!(result, Err(GenerateError::MissingStaticDocs(_))));
    }

    #[test]
    fn transform_error_names_note() {
        let tmp = setup_fixtures();
        write_note(
            tmp.path(),
            "Tools/broken.md",
            "---\ndescription: d\nauthor: me\n---\n# Broken\n\n## Contents\n\n## A\n",
        );
        let result = generate(tmp.path(), &NotesConfig::default());
        match result {
            Err(err @ GenerateError::Transform { .. }) => {
                assert!(err.to_string().starts_with("Tools/broken.md: unexpected front matter key 'author'"));
            }
            other => panic!("expected transform error, got {other:?}"),
        }
    }

    #[test]
    fn config_controls_link_extension() {
        let tmp = setup_fixtures();
        let mut config = NotesConfig::default();
        config.links.strip_md_extension = false;
        generate(tmp.path(), &config).unwrap();

        let branches =
            fs::read_to_string(tmp.path().join("_website/docs/tools/git/branches.md")).unwrap();
        assert!(branches.contains("[shell notes](../shell.md)"));
    }

    #[test]
    fn copy_tree_lowercases_on_request() {
        let tmp = TempDir::new().unwrap();
        write_note(tmp.path(), "src/Sub/File.PNG", "x");
        let copied = copy_tree(&tmp.path().join("src"), &tmp.path().join("out"), true).unwrap();
        assert_eq!(copied, 1);
        assert!(tmp.path().join("out/sub/file.png").is_file());
    }

    #[test]
    fn root_images_are_relocated() {
        let tmp = TempDir::new().unwrap();
        write_note(tmp.path(), "_img/Logo.png", "x");
        let copied = relocate_images(
            tmp.path(),
            Path::new(""),
            "_img",
            &tmp.path().join("out"),
        )
        .unwrap();
        assert_eq!(copied, 1);
        assert!(tmp.path().join("out/logo.png").is_file());
    }

    #[test]
    fn directory_without_images_copies_nothing() {
        let tmp = TempDir::new().unwrap();
        let copied =
            relocate_images(tmp.path(), Path::new("Dir"), "_img", &tmp.path().join("out")).unwrap();
        assert_eq!(copied, 0);
        assert!(!tmp.path().join("out").exists());
    }
}
