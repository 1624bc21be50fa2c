//! Noise normalization of the raw page stream
//!
//! Pages are concatenated into one buffer with pagination footers removed
//! and blank-line runs collapsed. Running the normalizer on its own output
//! returns the same buffer.

use regex::Regex;
use std::sync::LazyLock;

/// A line that is nothing but a page footer, e.g. `Page 42`
static FOOTER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*page\s+\d{1,4}\s*$").unwrap());

/// One or more footers glued to the end of a text line
///
/// Case-sensitive: footers print `Page`, while prose such as
/// `refer to page 12` is left alone.
static TRAILING_FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\s+Page\s+\d{1,4})+\s*$").unwrap());

/// Page text with pagination artifacts removed
///
/// Created once per document and never modified; every transformation
/// produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedBuffer(String);

impl NormalizedBuffer {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lines of the buffer with the byte offset where each starts
    pub fn lines_with_offsets(&self) -> Vec<(usize, &str)> {
        let mut offset = 0;
        self.0
            .split('\n')
            .map(|line| {
                let start = offset;
                offset += line.len() + 1;
                (start, line)
            })
            .collect()
    }

    /// Slice of the buffer, clamped to its bounds
    pub fn slice(&self, range: std::ops::Range<usize>) -> &str {
        let end = range.end.min(self.0.len());
        let start = range.start.min(end);
        &self.0[start..end]
    }
}

impl std::fmt::Display for NormalizedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip footers glued to the end of a line, e.g. `Ensure X is set Page 12`
pub fn strip_page_remnant(line: &str) -> &str {
    match TRAILING_FOOTER.find(line) {
        Some(m) => line[..m.start()].trim_end(),
        None => line.trim_end(),
    }
}

/// Concatenate pages in order and normalize the result
pub fn normalize_pages<S: AsRef<str>>(pages: &[S]) -> NormalizedBuffer {
    let joined = pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    normalize_text(&joined)
}

/// Normalize a linearized text
pub fn normalize_text(text: &str) -> NormalizedBuffer {
    let unified = text
        .replace("\r\n", "\n")
        .replace(['\r', '\u{0c}'], "\n");

    let mut out: Vec<&str> = Vec::new();
    for raw in unified.split('\n') {
        if raw.trim().is_empty() {
            // Keep one blank line as a paragraph break, never at the start
            if out.last().is_some_and(|prev| !prev.is_empty()) {
                out.push("");
            }
            continue;
        }
        // A line that was only footers disappears entirely
        let line = strip_page_remnant(raw);
        if line.trim().is_empty() || FOOTER_LINE.is_match(line) {
            continue;
        }
        out.push(line);
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    NormalizedBuffer(out.join("\n"))
}
