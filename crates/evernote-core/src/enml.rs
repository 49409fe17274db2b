//! ENML note envelope handling.
//!
//! Evernote stores note bodies as ENML: an XML declaration, a fixed DOCTYPE
//! and a single `<en-note>` root element. This module wraps text into that
//! envelope, splices `<en-media>` references for attachments, and strips the
//! markup back out for terminal display.
//!
//! This is not an ENML parser. Nothing here validates against the DTD or
//! understands nesting or attributes; `strip_to_plain_text` is a display
//! convenience and its output must never be sent back to the service.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EvernoteError, Result};
use crate::resource::ContentHash;

/// XML declaration and DOCTYPE required by the ENML content validator.
pub const ENML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?><!DOCTYPE en-note SYSTEM "http://xml.evernote.com/note/note.dtd">"#;

const OPEN_TAG: &str = "<en-note>";
const CLOSE_TAG: &str = "</en-note>";

static XML_DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\?xml[^?]*\?>").unwrap());
static DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!DOCTYPE[^>]*>").unwrap());
static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br\s*/?>|<div>|</div>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// A note body in transport (ENML) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDocument(String);

impl NoteDocument {
    /// Wrap content received from the service without touching it.
    pub fn from_enml(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Content between the root tags, if both are present.
    #[cfg(test)]
    fn body(&self) -> Option<&str> {
        let start = self.0.find(OPEN_TAG)? + OPEN_TAG.len();
        let end = self.0.rfind(CLOSE_TAG)?;
        self.0.get(start..end)
    }

    /// Insert `fragment` immediately before the closing root tag.
    fn insert_before_close(&self, fragment: &str) -> Result<NoteDocument> {
        let index = self.0.rfind(CLOSE_TAG).ok_or_else(|| {
            EvernoteError::MalformedDocument(format!("missing closing {} tag", CLOSE_TAG))
        })?;
        let mut content = String::with_capacity(self.0.len() + fragment.len());
        content.push_str(&self.0[..index]);
        content.push_str(fragment);
        content.push_str(&self.0[index..]);
        Ok(NoteDocument(content))
    }
}

impl fmt::Display for NoteDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NoteDocument> for String {
    fn from(doc: NoteDocument) -> Self {
        doc.0
    }
}

/// An inline `<en-media>` pointer to an attachment in the same note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub mime: String,
    pub hash: ContentHash,
}

impl MediaReference {
    pub fn new(mime: impl Into<String>, hash: ContentHash) -> Self {
        Self {
            mime: mime.into(),
            hash,
        }
    }

    /// Render the reference tag, e.g. `<en-media type="image/png" hash="..."/>`.
    pub fn tag(&self) -> String {
        format!(
            r#"<en-media type="{}" hash="{}"/>"#,
            escape_xml(&self.mime),
            self.hash.to_hex()
        )
    }
}

/// Escape the five XML metacharacters.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape `body` and wrap it in the ENML envelope.
pub fn wrap_plain_text(body: &str) -> NoteDocument {
    wrap_rich_text(&escape_xml(body))
}

/// Wrap already well-formed markup in the ENML envelope without escaping.
pub fn wrap_rich_text(body: &str) -> NoteDocument {
    NoteDocument(format!("{}{}{}{}", ENML_HEADER, OPEN_TAG, body, CLOSE_TAG))
}

/// Best-effort conversion of an ENML document to plain text for display.
///
/// Applied in order: declaration and DOCTYPE removal, `<br>`/`<div>`
/// boundaries to newlines, removal of every remaining tag, trim. Entities are
/// left escaped.
pub fn strip_to_plain_text(doc: &NoteDocument) -> String {
    let content = XML_DECLARATION.replace_all(doc.as_str(), "");
    let content = DOCTYPE.replace_all(&content, "");
    let content = BLOCK_BOUNDARY.replace_all(&content, "\n");
    let content = ANY_TAG.replace_all(&content, "");
    content.trim().to_string()
}

/// Insert one `<en-media>` tag per reference before the closing root tag.
///
/// Returns `MalformedDocument` and leaves the input untouched when the
/// document has no closing `</en-note>`.
pub fn splice_media_references(doc: &NoteDocument, refs: &[MediaReference]) -> Result<NoteDocument> {
    let block: String = refs.iter().map(MediaReference::tag).collect();
    doc.insert_before_close(&block)
}

/// Append escaped text to the end of an existing document body.
///
/// Existing markup and media references are kept as they are. A blank
/// paragraph separates the new text unless the current body is empty.
pub fn append_plain_text(doc: &NoteDocument, text: &str) -> Result<NoteDocument> {
    let existing = strip_to_plain_text(doc);
    let fragment = if existing.is_empty() {
        escape_xml(text)
    } else {
        format!("\n\n{}", escape_xml(text))
    };
    doc.insert_before_close(&fragment)
}
