//! The markup collaborator: splits a source document into its metadata block
//! and body, and converts the body from markdown to HTML.

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

/// Metadata extracted from a document's header. Keys are lower-cased; a key
/// may carry several values when it is continued over multiple lines.
pub type Metadata = BTreeMap<String, Vec<String>>;

/// The result of converting a single source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub metadata: Metadata,
    pub html: String,
}

/// Converts source documents. Holds the compiled metadata patterns so they are
/// built once per build rather than once per document.
pub struct Converter {
    meta_line: Regex,
    meta_continuation: Regex,
}

impl Converter {
    pub fn new() -> Result<Converter> {
        Ok(Converter {
            meta_line: Regex::new(r"^[ ]{0,3}([A-Za-z0-9_-]+):\s*(.*)$")?,
            meta_continuation: Regex::new(r"^[ ]{4,}(.*)$")?,
        })
    }

    /// Converts `input`, the full text of a source file. Links are left as
    /// written.
    pub fn convert(&self, input: &str) -> Converted {
        let (metadata, body_start) = self.metadata(input);
        Converted {
            metadata,
            html: to_html(&input[body_start..]),
        }
    }

    /// Parses the metadata block at the top of `input`, returning the
    /// metadata and the byte offset at which the body begins.
    ///
    /// An opening `---` line is dropped. The block then ends at a blank
    /// line or a `---`/`...` line, both of which are consumed, or at the
    /// first line that is neither a metadata line nor a continuation. That
    /// line stays in the body.
    fn metadata(&self, input: &str) -> (Metadata, usize) {
        let mut metadata = Metadata::new();
        let mut lines = input.split_inclusive('\n').peekable();
        let mut offset = 0;

        if matches!(lines.peek(), Some(first) if is_fence(first, false)) {
            if let Some(fence) = lines.next() {
                offset += fence.len();
            }
        }

        let mut key: Option<String> = None;
        for raw in lines {
            let line = raw.trim_end_matches(&['\r', '\n'][..]);
            if line.trim().is_empty() || is_fence(line, true) {
                return (metadata, offset + raw.len());
            }

            if let Some(captures) = self.meta_line.captures(line) {
                let k = captures[1].to_lowercase();
                metadata
                    .entry(k.clone())
                    .or_default()
                    .push(captures[2].trim().to_owned());
                key = Some(k);
            } else if let (Some(k), Some(captures)) =
                (&key, self.meta_continuation.captures(line))
            {
                if let Some(values) = metadata.get_mut(k) {
                    values.push(captures[1].trim().to_owned());
                }
            } else {
                return (metadata, offset);
            }
            offset += raw.len();
        }
        (metadata, offset)
    }
}

fn is_fence(line: &str, closing: bool) -> bool {
    let line = line.trim_end();
    line == "---" || (closing && line == "...")
}

fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

/// The result of a fallible conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error setting up a [`Converter`].
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the metadata patterns fail to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}
