//! Repository configuration module.
//!
//! Handles loading, validating, and merging the optional `notes.toml` file at
//! the repository root. Stock defaults describe the conventional layout; the
//! user file only needs the values it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [notes]
//! ignored_dirs = ["node_modules"]   # Directory names never walked
//! image_dir = "_img"                # Per-directory image folder
//!
//! [website]
//! root = "_website"                 # Website project, relative to the repo root
//! docs_dir = "docs"                 # Generated docs (relative to website.root)
//! docs_static_dir = "docs-static"   # Copied verbatim into docs_dir
//! images_dir = "static/img/from-notes"
//! images_url = "/img/from-notes"    # URL prefix images_dir is served from
//! sidebar_file = "sidebars.js"
//!
//! [sidebar]
//! about_label = "About"
//! about_items = ["about/introduction", "about/conventions"]
//!
//! [links]
//! strip_md_extension = true         # ./sub/note.md -> ./sub/note
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the repository root.
pub const CONFIG_FILE: &str = "notes.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `notes.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotesConfig {
    /// Which parts of the notes tree are walked.
    pub notes: NotesTreeConfig,
    /// Layout of the website project the docs are generated into.
    pub website: WebsiteConfig,
    /// Fixed entries of the generated sidebar.
    pub sidebar: SidebarConfig,
    /// Link rewriting options.
    pub links: LinksConfig,
}

impl NotesConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.website.images_url.starts_with('/') {
            return Err(ConfigError::Validation(
                "website.images_url must start with '/'".into(),
            ));
        }
        if !(self.notes.image_dir.starts_with('_') || self.notes.image_dir.starts_with('.')) {
            return Err(ConfigError::Validation(
                "notes.image_dir must start with '_' or '.' so it is not walked as notes".into(),
            ));
        }
        if self.sidebar.about_items.is_empty() {
            return Err(ConfigError::Validation(
                "sidebar.about_items must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotesTreeConfig {
    /// Directory names skipped in addition to `.`/`_`-prefixed ones.
    pub ignored_dirs: Vec<String>,
    /// Name of the image folder inside each notes directory.
    pub image_dir: String,
}

impl Default for NotesTreeConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: vec!["node_modules".to_string()],
            image_dir: "_img".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebsiteConfig {
    pub root: String,
    pub docs_dir: String,
    pub docs_static_dir: String,
    pub images_dir: String,
    pub images_url: String,
    pub sidebar_file: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            root: "_website".to_string(),
            docs_dir: "docs".to_string(),
            docs_static_dir: "docs-static".to_string(),
            images_dir: "static/img/from-notes".to_string(),
            images_url: "/img/from-notes".to_string(),
            sidebar_file: "sidebars.js".to_string(),
        }
    }
}

impl WebsiteConfig {
    pub fn docs_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.root).join(&self.docs_dir)
    }

    pub fn docs_static_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.root).join(&self.docs_static_dir)
    }

    pub fn images_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.root).join(&self.images_dir)
    }

    pub fn sidebar_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.root).join(&self.sidebar_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SidebarConfig {
    /// Label of the category prepended to the generated sidebar.
    pub about_label: String,
    /// Doc ids listed in that category, in order.
    pub about_items: Vec<String>,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            about_label: "About".to_string(),
            about_items: vec![
                "about/introduction".to_string(),
                "about/conventions".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    /// Drop the `.md` extension from internal link targets.
    pub strip_md_extension: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            strip_md_extension: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(NotesConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `notes.toml` from the repository root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config for the repository at `root`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<NotesConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: NotesConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `notes.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Notes repository configuration
# ===============================
# Place this file at the repository root as notes.toml.
# Every key is optional; the values below are the defaults.

[notes]
# Directory names that are never walked. Names starting with "." or "_"
# are always skipped.
ignored_dirs = ["node_modules"]
# Image folder inside each notes directory. Must start with "_" or ".".
image_dir = "_img"

[website]
# Website project root, relative to the repository root. All other
# website paths are relative to this directory.
root = "_website"
# Generated docs. Deleted and rebuilt on every `notes generate`.
docs_dir = "docs"
# Hand-written docs copied verbatim into docs_dir before generation.
docs_static_dir = "docs-static"
# Relocated note images. Deleted and rebuilt on every run.
images_dir = "static/img/from-notes"
# URL under which images_dir is served. Image links are rewritten to it.
images_url = "/img/from-notes"
# Generated sidebar manifest.
sidebar_file = "sidebars.js"

[sidebar]
# Category placed first in the sidebar, pointing at docs from docs_static_dir.
about_label = "About"
about_items = ["about/introduction", "about/conventions"]

[links]
# Rewrite internal links like sub/Note.md to ./sub/note instead of
# ./sub/note.md.
strip_md_extension = true
"##
}
