//! Document title and version detection

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Version line, e.g. `v2.0.0 - 06-26-2024`
static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[vV]\d+(?:\.\d+)*\b").unwrap());

/// Title used by exporters when none was detected
pub const PLACEHOLDER_TITLE: &str = "CIS Benchmark Document";

/// Document-level metadata from the cover page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub version: Option<String>,
}

impl DocumentMetadata {
    /// Title to print, falling back to the placeholder
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(PLACEHOLDER_TITLE)
    }

    /// Version to print, empty when unknown
    pub fn display_version(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }
}

/// Detect title and version on the front pages
///
/// On each page, the first version-shaped line ends the search and the
/// non-empty lines above it form the title. Without a version line the
/// first line mentioning "Benchmark" is taken as the title.
pub fn detect_metadata<S: AsRef<str>>(pages: &[S]) -> DocumentMetadata {
    for page in pages {
        let mut title_lines: Vec<&str> = Vec::new();
        for line in page.as_ref().lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }
            if VERSION_LINE.is_match(line) {
                let title = (!title_lines.is_empty()).then(|| title_lines.join(" "));
                return DocumentMetadata {
                    title,
                    version: Some(line.to_string()),
                };
            }
            title_lines.push(line);
        }
    }

    let title = pages
        .iter()
        .flat_map(|page| page.as_ref().lines())
        .map(str::trim)
        .find(|line| line.contains("Benchmark"))
        .map(str::to_string);

    DocumentMetadata {
        title,
        version: None,
    }
}
