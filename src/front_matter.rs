//! Front matter parsing and rendering.
//!
//! Notes start with a YAML block between `---` lines:
//!
//! ```text
//! ---
//! description: Branching, rebasing and recovering lost commits
//! tree_title: Git
//! last_modified: 2024-05-01T10:20:30.000Z
//! ---
//!
//! # Git
//! ```
//!
//! [`Attributes`] keeps the block as an ordered list of scalar pairs so a
//! rewrite preserves key order and leaves numbers and booleans as written. The generator additionally reads the block
//! through a closed schema ([`NoteFrontMatter`]) and emits the website's own
//! schema ([`DocFrontMatter`]).

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter is not closed with '---'")]
    Unterminated,
    #[error("front matter must be a mapping of keys to values")]
    NotAMapping,
    #[error("front matter key must be a string: {0:?}")]
    NonStringKey(Value),
    #[error("front matter value of '{0}' must be a plain value, not a list or mapping")]
    NonScalarValue(String),
    #[error("unexpected front matter key '{0}' (allowed: description, tree_title, last_modified)")]
    UnexpectedKey(String),
    #[error("front matter is missing 'description'")]
    MissingDescription,
}

/// Ordered scalar attributes of a front-matter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, Value)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw scalar stored under `key`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The value of `key` when it is a string.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Set `key` to a string, keeping its position if present, appending
    /// otherwise.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = Value::String(value.into());
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize as `key: value` lines, quoting values only where YAML needs it.
    pub fn to_yaml(&self) -> Result<String, FrontMatterError> {
        if self.0.is_empty() {
            return Ok(String::new());
        }
        let mapping: Mapping = self
            .0
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone()))
            .collect();
        Ok(serde_yaml::to_string(&mapping)?)
    }

    fn from_yaml(yaml: &str) -> Result<Self, FrontMatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        let mapping = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(m) => m,
            Value::Null => return Ok(Self::new()),
            _ => return Err(FrontMatterError::NotAMapping),
        };
        let mut attributes = Self::new();
        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s,
                other => return Err(FrontMatterError::NonStringKey(other)),
            };
            match value {
                Value::String(_) | Value::Bool(_) | Value::Number(_) | Value::Null => {}
                _ => return Err(FrontMatterError::NonScalarValue(key)),
            }
            match attributes.0.iter_mut().find(|(k, _)| *k == key) {
                Some((_, v)) => *v = value,
                None => attributes.0.push((key, value)),
            }
        }
        Ok(attributes)
    }
}

/// A markdown document split into front matter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub attributes: Attributes,
    /// Everything after the closing delimiter line.
    pub body: String,
}

/// Split `content` into front matter attributes and body.
///
/// A document without a leading `---` line has no attributes and its whole
/// content is the body.
pub fn parse(content: &str) -> Result<Document, FrontMatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = strip_delimiter_line(content) else {
        return Ok(Document {
            attributes: Attributes::new(),
            body: content.to_string(),
        });
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok(Document {
                attributes: Attributes::from_yaml(yaml)?,
                body: body.to_string(),
            });
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

fn strip_delimiter_line(content: &str) -> Option<&str> {
    let (first, rest) = match content.find('\n') {
        Some(i) => (&content[..i], &content[i + 1..]),
        None => (content, ""),
    };
    (first.trim_end() == DELIMITER).then_some(rest)
}

/// Render front matter and body back into a document.
///
/// The body is separated from the closing delimiter by exactly one blank line,
/// however many it started with.
pub fn render(attributes: &Attributes, body: &str) -> Result<String, FrontMatterError> {
    Ok(render_block(&attributes.to_yaml()?, body))
}

fn render_block(yaml: &str, body: &str) -> String {
    format!(
        "{DELIMITER}\n{yaml}{DELIMITER}\n\n{}",
        body.trim_start_matches(['\r', '\n'])
    )
}

// ============================================================================
// Generator schemas
// ============================================================================

/// Front matter accepted on notes fed to the site generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFrontMatter {
    pub description: String,
    pub tree_title: Option<String>,
}

impl NoteFrontMatter {
    /// Validate the closed key set. `last_modified` is maintained by the
    /// pre-commit check and is accepted but not carried over.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self, FrontMatterError> {
        let mut description = None;
        let mut tree_title = None;
        for (key, value) in attributes.iter() {
            match key {
                "description" => description = Some(scalar_text(value)),
                "tree_title" => tree_title = Some(scalar_text(value)),
                "last_modified" => {}
                other => return Err(FrontMatterError::UnexpectedKey(other.to_string())),
            }
        }
        Ok(Self {
            description: description.ok_or(FrontMatterError::MissingDescription)?,
            tree_title,
        })
    }
}

/// Text of a scalar as it reads in the YAML source.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Front matter written to generated docs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocFrontMatter {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
}

impl DocFrontMatter {
    pub fn render(&self, body: &str) -> Result<String, FrontMatterError> {
        Ok(render_block(&serde_yaml::to_string(self)?, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_attributes_and_body() {
        let doc = parse("---\ndescription: \"x\"\ntree_title: Git\n---\n\n# Title\n").unwrap();
        assert_eq!(doc.attributes.get("description"), Some("x"));
        assert_eq!(doc.attributes.get("tree_title"), Some("Git"));
        assert_eq!(doc.body, "\n# Title\n");
    }

    #[test]
    fn parse_without_front_matter_keeps_everything_as_body() {
        let doc = parse("# Title\n\nText\n").unwrap();
        assert!(doc.attributes.is_empty());
        assert_eq!(doc.body, "# Title\n\nText\n");
    }

    #[test]
    fn parse_empty_block() {
        let doc = parse("---\n---\n# Title\n").unwrap();
        assert!(doc.attributes.is_empty());
        assert_eq!(doc.body, "# Title\n");
    }

    #[test]
    fn parse_keeps_scalar_types() {
        let doc = parse("---\ncount: 3\ndraft: true\n---\n").unwrap();
        assert_eq!(doc.attributes.value("count"), Some(&Value::Number(3u64.into())));
        assert_eq!(doc.attributes.value("draft"), Some(&Value::Bool(true)));
        assert_eq!(doc.attributes.get("count"), None);
        assert!(doc.attributes.contains_key("draft"));
    }

    #[test]
    fn rewrite_leaves_number_and_bool_values_unquoted() {
        let mut doc = parse("---\ncount: 3\ndraft: true\nratio: 0.5\n---\n# T\n").unwrap();
        doc.attributes.set("last_modified", "2024-05-01T10:20:30.000Z");
        assert_eq!(
            render(&doc.attributes, &doc.body).unwrap(),
            "---\ncount: 3\ndraft: true\nratio: 0.5\nlast_modified: 2024-05-01T10:20:30.000Z\n---\n\n# T\n"
        );
    }

    #[test]
    fn note_schema_reads_non_string_description() {
        let doc = parse("---\ndescription: 2024\n---\n").unwrap();
        let fm = NoteFrontMatter::from_attributes(&doc.attributes).unwrap();
        assert_eq!(fm.description, "2024");
    }

    #[test]
    fn parse_unterminated_is_error() {
        let result = parse("---\ndescription: x\n# Title\n");
        assert!(matches!(result, Err(FrontMatterError::Unterminated)));
    }

    #[test]
    fn parse_list_value_is_error() {
        let result = parse("---\ntags:\n  - a\n  - b\n---\n");
        assert!(matches!(result, Err(FrontMatterError::NonScalarValue(k)) if k == "tags"));
    }

    #[test]
    fn parse_preserves_key_order() {
        let doc = parse("---\nzeta: 1\nalpha: 2\nmid: 3\n---\n").unwrap();
        let keys: Vec<&str> = doc.attributes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut attributes = Attributes::new();
        attributes.set("a", "1");
        attributes.set("b", "2");
        attributes.set("a", "3");
        let keys: Vec<&str> = attributes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(attributes.get("a"), Some("3"));
    }

    #[test]
    fn render_writes_key_value_lines() {
        let mut attributes = Attributes::new();
        attributes.set("description", "x");
        attributes.set("last_modified", "2024-05-01T10:20:30.000Z");
        let out = render(&attributes, "\n\n# Title\n").unwrap();
        assert_eq!(
            out,
            "---\ndescription: x\nlast_modified: 2024-05-01T10:20:30.000Z\n---\n\n# Title\n"
        );
    }

    #[test]
    fn round_trip_preserves_attributes() {
        let mut attributes = Attributes::new();
        attributes.set("description", "Notes: on colons, quotes \" and 'ticks'");
        attributes.set("tree_title", "  padded  ");
        attributes.set("number_like", "42");
        attributes.set("bool_like", "true");
        attributes.set("empty", "");
        attributes.set("last_modified", "2024-05-01T10:20:30.000Z");

        let rendered = render(&attributes, "# Title\n").unwrap();
        let reparsed = parse(&rendered).unwrap();
        assert_eq!(reparsed.attributes, attributes);
        assert_eq!(reparsed.body, "\n# Title\n");
    }

    #[test]
    fn note_schema_accepts_known_keys() {
        let doc = parse("---\ndescription: d\ntree_title: t\nlast_modified: now\n---\n").unwrap();
        let fm = NoteFrontMatter::from_attributes(&doc.attributes).unwrap();
        assert_eq!(fm.description, "d");
        assert_eq!(fm.tree_title.as_deref(), Some("t"));
    }

    #[test]
    fn note_schema_rejects_unknown_key() {
        let doc = parse("---\ndescription: d\ntags: x\n---\n").unwrap();
        let result = NoteFrontMatter::from_attributes(&doc.attributes);
        assert!(matches!(result, Err(FrontMatterError::UnexpectedKey(k)) if k == "tags"));
    }

    #[test]
    fn note_schema_requires_description() {
        let doc = parse("---\ntree_title: t\n---\n").unwrap();
        let result = NoteFrontMatter::from_attributes(&doc.attributes);
        assert!(matches!(result, Err(FrontMatterError::MissingDescription)));
    }

    #[test]
    fn doc_front_matter_omits_missing_sidebar_label() {
        let fm = DocFrontMatter {
            title: "Title".to_string(),
            description: "x".to_string(),
            sidebar_label: None,
        };
        assert_eq!(
            fm.render("x\n").unwrap(),
            "---\ntitle: Title\ndescription: x\n---\n\nx\n"
        );
    }

    #[test]
    fn doc_front_matter_includes_sidebar_label() {
        let fm = DocFrontMatter {
            title: "Title".to_string(),
            description: "x".to_string(),
            sidebar_label: Some("Short".to_string()),
        };
        assert!(fm.render("").unwrap().contains("sidebar_label: Short\n"));
    }
}
