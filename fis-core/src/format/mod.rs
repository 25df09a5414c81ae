//! The File Interaction Script (FIS) document format.
//!
//! A document is a flat run of records:
//!
//! ```text
//! $$$ src/main.rs
//! fn main() {}
//! $$$ assets/logo.png [BINARY]
//! $$$ src/old.rs [DELETE]
//! ```
//!
//! Each record starts with [`RECORD_PREFIX`] followed by a path relative to the
//! project root and an optional bracketed directive. Everything up to the next
//! prefix is the file content. Documents meant for a language model are
//! prefixed with an instruction preamble and wrapped in a ```` ```fis ```` fence,
//! and may contain `{/* ... */}` comments anywhere.
//!
//! ## Known limitation
//! The prefix is not escaped. A file whose content contains `$$$ ` will be
//! split into bogus records on decode, and content containing `{/* ... */}`
//! (JSX comments, for example) loses those spans. Both are inherent to the
//! format and are left as is so that documents stay byte-compatible with
//! other FIS tooling.
//!
//! The ```` ```fis ```` fence is only honored when it precedes the first
//! record. Snapshots start with a record, so a fence inside some file's
//! content is left alone; a reply that mentions `$$$ ` in prose before its
//! fence is decoded unfenced.

use std::fmt;

pub mod decode;
pub mod encode;
pub mod preamble;

/// Token that introduces every record header.
pub const RECORD_PREFIX: &str = "$$$ ";

/// Opening fence line (including its newline).
pub const OPEN_FENCE: &str = "```fis\n";

/// Closing fence, anchored to the preceding newline.
pub const CLOSE_FENCE: &str = "\n```";

/// Conventional extension of FIS documents.
pub const FILE_EXTENSION: &str = "fis";

/// Operation attached to a record header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Directive {
    /// No tag: create or overwrite.
    #[default]
    Default,
    New,
    Replace,
    Delete,
    Binary,
    /// A bracketed tag this tool does not understand. Kept so the applier can
    /// report the record as failed instead of guessing.
    Unknown(String),
}

impl Directive {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "NEW" => Self::New,
            "REPLACE" => Self::Replace,
            "DELETE" => Self::Delete,
            "BINARY" => Self::Binary,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::New => Some("NEW"),
            Self::Replace => Some("REPLACE"),
            Self::Delete => Some("DELETE"),
            Self::Binary => Some("BINARY"),
            Self::Unknown(tag) => Some(tag),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "[{tag}]"),
            None => f.write_str("(default)"),
        }
    }
}

/// One file entry of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Path relative to the project root, always `/`-separated when produced by
    /// the encoder.
    pub path: String,
    pub directive: Directive,
    /// `None` when the header was the last line of the document; `Some("")`
    /// when a newline followed it but nothing else did.
    pub content: Option<String>,
}

impl Record {
    pub fn new(path: impl Into<String>, directive: Directive, content: Option<String>) -> Self {
        Self {
            path: path.into(),
            directive,
            content,
        }
    }

    /// Content that counts as "provided" for directive purposes.
    pub fn provided_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    /// Header line without its trailing newline, e.g. `$$$ a.txt [DELETE]`.
    pub fn header(&self) -> String {
        match self.directive.tag() {
            Some(tag) => format!("{RECORD_PREFIX}{} [{tag}]", self.path),
            None => format!("{RECORD_PREFIX}{}", self.path),
        }
    }

    /// Appends the record in document form.
    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.header());
        out.push('\n');
        if let Some(content) = &self.content {
            out.push_str(content);
        }
    }
}
