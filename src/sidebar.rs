//! Sidebar manifest for the website.
//!
//! The sidebar mirrors the notes tree: every directory becomes a category
//! labelled with its README title, every note a doc id. Files come before
//! subdirectories at each level. A fixed "About" category pointing at the
//! hand-written docs is placed first.
//!
//! ```text
//! module.exports = {
//!   "docs": [
//!     { "type": "category", "label": "About", "items": ["about/introduction", ...] },
//!     "welcome",
//!     { "type": "category", "label": "Tools & Utilities", "items": ["tools/shell", ...] }
//!   ]
//! };
//! ```
//!
//! Category labels are read from the first `# ` line of the README wherever it
//! is, unlike the pre-commit check which insists on line 3. The check runs on
//! commits while READMEs may be edited by hand in between, so generation does
//! not rely on that layout.

use crate::config::SidebarConfig;
use crate::walk::{self, Entry, TreeWalker};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}: directory has no README.md to take a sidebar label from")]
    MissingReadme(String),
    #[error("{0}: README.md has no '# ' title line")]
    MissingTitle(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sidebars {
    pub docs: Vec<SidebarItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SidebarItem {
    Doc(String),
    Category(Category),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "category")]
pub struct Category {
    pub label: String,
    pub items: Vec<SidebarItem>,
}

impl Sidebars {
    /// Number of categories, the About category included.
    pub fn category_count(&self) -> usize {
        fn count(items: &[SidebarItem]) -> usize {
            items
                .iter()
                .map(|item| match item {
                    SidebarItem::Doc(_) => 0,
                    SidebarItem::Category(c) => 1 + count(&c.items),
                })
                .sum()
        }
        count(&self.docs)
    }

    /// Render as the `sidebars.js` module.
    pub fn to_module(&self) -> Result<String, serde_json::Error> {
        Ok(format!(
            "module.exports = {};\n",
            serde_json::to_string_pretty(self)?
        ))
    }
}

/// Build the sidebar for the tree the walker covers.
pub fn build_sidebar(walker: &TreeWalker, config: &SidebarConfig) -> Result<Sidebars, SidebarError> {
    let about = SidebarItem::Category(Category {
        label: config.about_label.clone(),
        items: config
            .about_items
            .iter()
            .cloned()
            .map(SidebarItem::Doc)
            .collect(),
    });
    let mut docs = vec![about];
    docs.extend(build_items(walker, Path::new(""))?);
    Ok(Sidebars { docs })
}

fn build_items(walker: &TreeWalker, rel_dir: &Path) -> Result<Vec<SidebarItem>, SidebarError> {
    let mut items = Vec::new();
    for entry in walker.children(rel_dir)? {
        match entry {
            Entry::File(file) => items.push(SidebarItem::Doc(doc_id(&file))),
            Entry::Directory(dir) => {
                let label = readme_title(walker.root(), &dir)?;
                items.push(SidebarItem::Category(Category {
                    label,
                    items: build_items(walker, &dir)?,
                }));
            }
        }
    }
    Ok(items)
}

/// Website doc id of a note: lower-cased relative path without extension.
pub fn doc_id(rel_path: &Path) -> String {
    walk::relative_id(&rel_path.with_extension("")).to_lowercase()
}

/// First `# ` title of a directory README.
fn readme_title(root: &Path, rel_dir: &Path) -> Result<String, SidebarError> {
    let rel = walk::relative_id(rel_dir);
    let content = match fs::read_to_string(root.join(rel_dir).join(walk::README)) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(SidebarError::MissingReadme(rel)),
        Err(e) => return Err(e.into()),
    };
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .ok_or(SidebarError::MissingTitle(rel))
}
