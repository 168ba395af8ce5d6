//! block marker scanning and splicing
//!
//! a marker is an HTML-comment annotation carrying the block-type literal
//! and a JSON object payload:
//!
//! ```text
//! <!-- block:dynif/conditional {"conditions":[...]} -->
//! ```
//!
//! rewrites never touch anything but the payload span, and edits are
//! applied back-to-front so earlier offsets stay valid while later-in-text
//! replacements change the string length.

use std::ops::Range;

use regex::Regex;

/// the fixed block-type identifier embedded in marker syntax
pub const BLOCK_NAME: &str = "dynif/conditional";

lazy_static::lazy_static! {
    static ref MARKER_RE: Regex = Regex::new(&format!(
        r"(?s)<!--\s*block:{}\s+(\{{.*?\}})\s*/?-->",
        regex::escape(BLOCK_NAME)
    ))
    .unwrap();
}

/// one payload-bearing marker found in content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    /// byte span of the whole marker
    pub span: Range<usize>,
    /// byte span of the JSON payload within the content
    pub payload_span: Range<usize>,
    /// the raw payload text
    pub payload: &'a str,
}

/// find all payload-bearing markers, in order of appearance
pub fn scan(content: &str) -> Vec<Marker<'_>> {
    MARKER_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let payload = caps.get(1)?;
            Some(Marker {
                span: whole.range(),
                payload_span: payload.range(),
                payload: payload.as_str(),
            })
        })
        .collect()
}

/// a single splice: replace `span` with `replacement`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Range<usize>,
    pub replacement: String,
}

/// apply non-overlapping edits, back-to-front
pub fn apply_edits(content: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut out = content.to_string();
    for edit in edits {
        out.replace_range(edit.span, &edit.replacement);
    }
    out
}
