//! Link and image rewriting for generated docs.
//!
//! Notes link to each other and to their images the way a markdown viewer on
//! the repository expects; the website needs something else:
//!
//! | Source | Rewritten to |
//! |--------|--------------|
//! | `![Graph](_img/Graph.PNG)` in `Tools/Git/x.md` | `![Graph](/img/from-notes/tools/git/graph.png)` |
//! | `[Shell](../Shell.md#Usage)` | `[Shell](../shell#usage)` |
//! | `[Branches](Git/Branches.md)` | `[Branches](./git/branches)` |
//! | `[Rust](https://rust-lang.org)` | `<a href="https://rust-lang.org" target="_blank" rel="nofollow noopener noreferrer">Rust</a>` |
//!
//! External links must have plain text as their only content; anything richer
//! (emphasis, code, images) is rejected because it cannot be carried into the
//! raw anchor.
//!
//! The rewrite walks pulldown-cmark events with their source offsets and
//! collects edits, which are then applied to a copy of the source. Everything
//! not touched by an edit keeps its original formatting, and nothing inside
//! code blocks or code spans is ever considered a link.

use maud::html;
use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("external link to {url} must contain exactly one plain text child")]
    ExternalLinkContent { url: String },
}

/// Rewrites the links of one note.
pub struct LinkRewriter<'a> {
    /// Forward-slash directory of the note, relative to the notes root.
    pub note_dir: &'a str,
    /// URL prefix relocated images are served from.
    pub images_url: &'a str,
    pub strip_md_extension: bool,
}

struct Edit {
    range: Range<usize>,
    replacement: String,
}

type Spanned<'s> = (Event<'s>, Range<usize>);

impl LinkRewriter<'_> {
    /// Return `markdown` with links and images rewritten for the website.
    pub fn rewrite(&self, markdown: &str) -> Result<String, LinkError> {
        let events: Vec<Spanned> = Parser::new_ext(markdown, parser_options())
            .into_offset_iter()
            .collect();

        let mut edits = Vec::new();
        let mut i = 0;
        while i < events.len() {
            let (event, range) = &events[i];
            match event {
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    ..
                }) if *link_type == LinkType::Inline && !is_external(dest_url) => {
                    let end = matching_end(&events, i, TagEnd::Image);
                    let text_end = content_end(&events[i + 1..end], range.start + 2);
                    let url = self.image_url(dest_url);
                    edits.extend(destination_edit(markdown, range, text_end, &url, title));
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    ..
                }) => {
                    let end = matching_end(&events, i, TagEnd::Link);
                    if is_external(dest_url)
                        && matches!(link_type, LinkType::Inline | LinkType::Autolink)
                    {
                        let text = plain_text(&events[i + 1..end]).ok_or_else(|| {
                            LinkError::ExternalLinkContent {
                                url: dest_url.to_string(),
                            }
                        })?;
                        edits.push(Edit {
                            range: range.clone(),
                            replacement: external_anchor(dest_url, &text),
                        });
                        i = end + 1;
                        continue;
                    }
                    if *link_type == LinkType::Inline
                        && let Some(url) = self.internal_url(dest_url)
                    {
                        let text_end = content_end(&events[i + 1..end], range.start + 1);
                        edits.extend(destination_edit(markdown, range, text_end, &url, title));
                    }
                }
                _ => {}
            }
            i += 1;
        }

        Ok(apply_edits(markdown, edits))
    }

    /// `/img/from-notes/<note dir>/<file name>`, lower-cased.
    pub fn image_url(&self, dest: &str) -> String {
        let file_name = dest.rsplit(['/', '\\']).next().unwrap_or(dest);
        let prefix = self.images_url.trim_end_matches('/');
        let url = if self.note_dir.is_empty() {
            format!("{prefix}/{file_name}")
        } else {
            format!("{prefix}/{}/{file_name}", self.note_dir)
        };
        url.to_lowercase()
    }

    /// Website form of a link to another note, or `None` for links that are
    /// left alone: in-page anchors, site-absolute paths, other URI schemes.
    pub fn internal_url(&self, dest: &str) -> Option<String> {
        if dest.is_empty() || dest.starts_with('#') || dest.starts_with('/') || has_scheme(dest) {
            return None;
        }
        let url = dest.to_lowercase().replace('\\', "/");
        let url = if self.strip_md_extension {
            let (path, fragment) = match url.find('#') {
                Some(i) => url.split_at(i),
                None => (url.as_str(), ""),
            };
            format!("{}{fragment}", path.strip_suffix(".md").unwrap_or(path))
        } else {
            url
        };
        Some(if dest.starts_with('.') {
            url
        } else {
            format!("./{url}")
        })
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// `mailto:`, `ftp:` and friends.
fn has_scheme(url: &str) -> bool {
    match url.find(':') {
        Some(i) if i > 0 => url[..i]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

/// Index of the `End` event closing the element started at `start`.
fn matching_end(events: &[Spanned], start: usize, tag: TagEnd) -> usize {
    let mut depth = 0usize;
    for (offset, (event, _)) in events[start..].iter().enumerate() {
        match event {
            Event::Start(t) if t.to_end() == tag => depth += 1,
            Event::End(t) if *t == tag => {
                depth -= 1;
                if depth == 0 {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    events.len() - 1
}

/// Source offset just past the element's text (link text or image alt).
fn content_end(children: &[Spanned], text_start: usize) -> usize {
    children
        .iter()
        .map(|(_, r)| r.end)
        .max()
        .unwrap_or(text_start)
        .max(text_start)
}

/// Edit replacing `](old)` of an inline link or image with `](url "title")`.
fn destination_edit(
    markdown: &str,
    range: &Range<usize>,
    text_end: usize,
    url: &str,
    title: &CowStr,
) -> Option<Edit> {
    let close = markdown[text_end..range.end].find("](")? + text_end;
    let title = if title.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", title.replace('\\', "\\\\").replace('"', "\\\""))
    };
    let url = if url.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        format!("<{url}>")
    } else {
        url.to_string()
    };
    Some(Edit {
        range: close..range.end,
        replacement: format!("]({url}{title})"),
    })
}

/// The element's content when it is nothing but text. Text wrapped onto
/// several source lines is joined with spaces.
fn plain_text(children: &[Spanned]) -> Option<String> {
    if children.is_empty() {
        return None;
    }
    children
        .iter()
        .map(|(event, _)| match event {
            Event::Text(text) => Some(text.as_ref()),
            Event::SoftBreak => Some(" "),
            _ => None,
        })
        .collect::<Option<String>>()
}

fn external_anchor(url: &str, text: &str) -> String {
    html! {
        a href=(url) target="_blank" rel="nofollow noopener noreferrer" { (text) }
    }
    .into_string()
}

fn apply_edits(markdown: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| e.range.start);
    let mut out = String::with_capacity(markdown.len());
    let mut cursor = 0;
    for edit in edits {
        out.push_str(&markdown[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&markdown[cursor..]);
    out
}
