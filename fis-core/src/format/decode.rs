use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::preamble::PreambleLanguage;
use super::{Directive, Record, CLOSE_FENCE, OPEN_FENCE, RECORD_PREFIX};

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{/\*.*?\*/\}").expect("comment pattern is valid"))
}

/// Trailing `[TAG]` on a header line. Any tag separated from the path by
/// whitespace is captured, so paths like `pages/[id].tsx` keep their brackets.
/// A known tag glued to the path (`a.txt[DELETE]`) is accepted as well.
fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<path>.*?)(?:\s+\[(?P<tag>[A-Za-z_]+)\]|\[(?P<known>(?i:new|replace|delete|binary))\])\s*$",
        )
        .expect("tag pattern is valid")
    })
}

/// Decodes a raw document into its records, in document order.
///
/// Tolerates partially conformant input: an unknown preamble, a missing fence
/// or a missing closing fence all fall back to using the text as is.
pub fn decode(raw: &str) -> Vec<Record> {
    let effective = effective_document(raw);

    let records: Vec<Record> = effective
        .split(RECORD_PREFIX)
        .skip(1)
        .map(parse_record)
        .collect();

    debug!("Decoded {} records", records.len());
    records
}

/// Strips preamble, comments and fence, returning the text the records live in.
pub fn effective_document(raw: &str) -> String {
    let mut document = raw;
    if let Some(lang) = PreambleLanguage::detect(document) {
        debug!("Stripping {} preamble", lang.code());
        document = document[lang.text().len()..].trim_start();
    }

    let without_comments = comment_regex().replace_all(document, "");
    extract_fenced(&without_comments).to_string()
}

/// Returns the text between the first opening fence and the last closing fence
/// after it, or the whole input when either is missing.
///
/// A fence that appears only after the first record belongs to some file's
/// content (an older `.fis` document, a README showing the format) and is
/// not treated as the document fence.
fn extract_fenced(document: &str) -> &str {
    let Some(open) = document.find(OPEN_FENCE) else {
        return document;
    };
    if document
        .find(RECORD_PREFIX)
        .is_some_and(|first_record| first_record < open)
    {
        return document;
    }
    let body = &document[open + OPEN_FENCE.len()..];
    match body.rfind(CLOSE_FENCE) {
        Some(close) => &body[..close],
        None => {
            debug!("Opening fence without closing fence, using document as is");
            document
        }
    }
}

fn parse_record(segment: &str) -> Record {
    let (header, content) = match segment.split_once('\n') {
        Some((header, content)) => (header, Some(content.to_string())),
        None => (segment, None),
    };
    let header = header.trim();

    match tag_regex().captures(header) {
        Some(caps) => Record {
            path: caps["path"].trim().to_string(),
            directive: Directive::from_tag(
                &caps
                    .name("tag")
                    .or_else(|| caps.name("known"))
                    .map_or("", |m| m.as_str())
                    .to_ascii_uppercase(),
            ),
            content,
        },
        None => Record {
            path: header.to_string(),
            directive: Directive::Default,
            content,
        },
    }
}
