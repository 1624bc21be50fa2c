//! Text segmentation of a benchmark document
//!
//! This module turns linearized page text into recommendation records:
//! 1. **Title detection** on the front pages
//! 2. **Normalization** of the recommendation pages into one buffer
//! 3. **Boundary scanning** for numbering lines
//! 4. **Section splitting** of each block
//! 5. **Assembly** of the final records
//!
//! Everything here is a pure function of its inputs. Structural problems
//! are returned as warnings alongside the records.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Submodules
mod assemble;
mod boundary;
mod normalize;
mod profile_level;
mod recommendation_number;
mod section;
mod title;
mod warning;

// Re-export public types
pub use assemble::{assemble, Benchmark, Recommendation};
pub use boundary::{BoundaryMark, BoundaryScanner, ScanResult, SkippedCandidate};
pub use normalize::{normalize_pages, normalize_text, strip_page_remnant, NormalizedBuffer};
pub use profile_level::ProfileLevel;
pub use recommendation_number::RecommendationNumber;
pub use section::{
    match_label, split_sections, Label, SectionKind, SectionMap, SectionSplit, EXCLUDED_LABEL,
};
pub use title::{detect_metadata, DocumentMetadata, PLACEHOLDER_TITLE};
pub use warning::StructuralWarning;

/// Default number of lines searched below a numbering line for its
/// `Profile Applicability:` label
pub const DEFAULT_APPLICABILITY_LOOKAHEAD: usize = 10;

/// Tunables for the segmentation core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationOptions {
    /// Lines searched below a candidate numbering line
    pub applicability_lookahead: usize,

    /// Line prefixes that end the recommendation region (appendices)
    pub end_markers: Vec<String>,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            applicability_lookahead: DEFAULT_APPLICABILITY_LOOKAHEAD,
            end_markers: default_end_markers(),
        }
    }
}

/// Appendix headings that follow the last recommendation
pub fn default_end_markers() -> Vec<String> {
    [
        "Appendix: Summary Table",
        "Appendix: Recommendation Summary Table",
        "Appendix: Change History",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Segment a benchmark document
///
/// # Parameters
/// * `front_pages` - First pages of the document, searched for title and version
/// * `region_pages` - Pages holding the recommendations, in order
/// * `options` - Scanner tunables
///
/// # Returns
/// * `Benchmark` - Metadata, records in document order, and structural warnings
pub fn segment<S: AsRef<str>>(
    front_pages: &[S],
    region_pages: &[S],
    options: &SegmentationOptions,
) -> Benchmark {
    let metadata = detect_metadata(front_pages);
    let mut warnings = Vec::new();
    if metadata.title.is_none() {
        warnings.push(StructuralWarning::TitleNotFound {
            pages: front_pages.len(),
        });
    }
    if metadata.version.is_none() {
        warnings.push(StructuralWarning::VersionNotFound {
            pages: front_pages.len(),
        });
    }

    let buffer = normalize_pages(region_pages);
    log::info!("Normalized buffer: {} bytes", buffer.len());

    let scan = BoundaryScanner::new(options).scan(&buffer);
    log::info!(
        "Found {} recommendation boundaries ({} skipped)",
        scan.marks.len(),
        scan.skipped.len()
    );

    let blocks = split_blocks(&buffer, &scan);
    warnings.extend(scan.warnings);

    let mut pairs = Vec::with_capacity(blocks.len());
    for (mark, split) in scan.marks.into_iter().zip(blocks) {
        warnings.extend(split.warning);
        pairs.push((mark, split.sections));
    }

    let benchmark = assemble(metadata, pairs, warnings);
    for warning in &benchmark.warnings {
        log::warn!("{}", warning);
    }
    benchmark
}

/// Split every block into sections (optionally in parallel)
fn split_blocks(buffer: &NormalizedBuffer, scan: &ScanResult) -> Vec<SectionSplit> {
    let spans = scan.block_spans();

    #[cfg(feature = "parallel")]
    let splits: Vec<SectionSplit> = scan
        .marks
        .par_iter()
        .zip(spans.par_iter())
        .map(|(mark, span)| split_sections(buffer.slice(span.clone()), mark))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let splits: Vec<SectionSplit> = scan
        .marks
        .iter()
        .zip(spans.iter())
        .map(|(mark, span)| split_sections(buffer.slice(span.clone()), mark))
        .collect();

    splits
}
