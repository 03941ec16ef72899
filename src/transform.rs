//! Conversion of one note into a website doc.
//!
//! Each step consumes the previous state, so a doc can only be rendered after
//! every step has run, in order:
//!
//! ```text
//! RawNote ──parse──▶ ParsedNote ──strip_toc──▶ TocStripped
//!         ──adjust_links──▶ LinksAdjusted ──replace_front_matter──▶ GeneratedDoc
//! ```
//!
//! Given
//!
//! ```text
//! ---
//! description: Working with branches
//! tree_title: Branches
//! ---
//! # Git Branches
//!
//! ## Contents
//! - [Creating](#creating)
//!
//! ## Creating
//! ...
//! ```
//!
//! the generated doc is
//!
//! ```text
//! ---
//! title: Git Branches
//! description: Working with branches
//! sidebar_label: Branches
//! ---
//!
//! Working with branches
//!
//! ## Creating
//! ...
//! ```

use crate::check::CONTENTS_HEADING;
use crate::front_matter::{self, DocFrontMatter, FrontMatterError, NoteFrontMatter};
use crate::links::{LinkError, LinkRewriter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
    #[error("missing '## Contents' heading")]
    MissingContents,
    #[error("no '## ' heading after '## Contents'; the table of contents has no end")]
    UnterminatedContents,
    #[error("first line must be the '# ' title")]
    MissingTitle,
    #[error("title '{0}' contains code, which the website cannot render in titles")]
    CodeInTitle(String),
    #[error(transparent)]
    Link(#[from] LinkError),
}

pub struct RawNote<'a> {
    pub content: &'a str,
}

pub struct ParsedNote {
    pub front_matter: NoteFrontMatter,
    pub body: String,
}

pub struct TocStripped {
    pub front_matter: NoteFrontMatter,
    pub body: String,
}

pub struct LinksAdjusted {
    pub front_matter: NoteFrontMatter,
    pub body: String,
}

pub struct GeneratedDoc {
    pub front_matter: DocFrontMatter,
    pub body: String,
}

impl<'a> RawNote<'a> {
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    pub fn parse(self) -> Result<ParsedNote, TransformError> {
        let doc = front_matter::parse(self.content)?;
        Ok(ParsedNote {
            front_matter: NoteFrontMatter::from_attributes(&doc.attributes)?,
            body: doc.body.trim_start().to_string(),
        })
    }
}

impl ParsedNote {
    /// Remove everything from `## Contents` up to the next `## ` heading.
    pub fn strip_toc(self) -> Result<TocStripped, TransformError> {
        let start = line_offsets(&self.body)
            .find(|(_, line)| line.trim_end() == CONTENTS_HEADING)
            .map(|(offset, _)| offset)
            .ok_or(TransformError::MissingContents)?;
        let next = line_offsets(&self.body)
            .find(|(offset, line)| *offset > start && line.starts_with("## "))
            .map(|(offset, _)| offset)
            .ok_or(TransformError::UnterminatedContents)?;

        Ok(TocStripped {
            front_matter: self.front_matter,
            body: format!("{}{}", &self.body[..start], &self.body[next..]),
        })
    }
}

impl TocStripped {
    pub fn adjust_links(self, rewriter: &LinkRewriter) -> Result<LinksAdjusted, TransformError> {
        Ok(LinksAdjusted {
            body: rewriter.rewrite(&self.body)?,
            front_matter: self.front_matter,
        })
    }
}

impl LinksAdjusted {
    /// Move the `# Title` line into front matter and open the doc with the
    /// description.
    pub fn replace_front_matter(self) -> Result<GeneratedDoc, TransformError> {
        let (first_line, rest) = match self.body.find('\n') {
            Some(i) => self.body.split_at(i),
            None => (self.body.as_str(), ""),
        };
        let title = first_line
            .strip_prefix("# ")
            .map(str::trim)
            .ok_or(TransformError::MissingTitle)?;
        if title.contains('`') {
            return Err(TransformError::CodeInTitle(title.to_string()));
        }

        let NoteFrontMatter {
            description,
            tree_title,
        } = self.front_matter;
        let body = format!("{description}{rest}");
        Ok(GeneratedDoc {
            front_matter: DocFrontMatter {
                title: title.to_string(),
                description,
                sidebar_label: tree_title,
            },
            body,
        })
    }
}

impl GeneratedDoc {
    pub fn render(&self) -> Result<String, TransformError> {
        Ok(self.front_matter.render(&self.body)?)
    }
}

/// Run every step on a note's content and render the doc.
pub fn transform_note(content: &str, rewriter: &LinkRewriter) -> Result<String, TransformError> {
    RawNote::new(content)
        .parse()?
        .strip_toc()?
        .adjust_links(rewriter)?
        .replace_front_matter()?
        .render()
}

/// `(byte offset, line)` for every line of `text`, line endings included.
fn line_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}
