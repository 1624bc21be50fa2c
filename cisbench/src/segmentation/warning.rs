//! Structural warnings raised while segmenting a benchmark
//!
//! Warnings are data: they travel with the result and never abort a run.

use super::RecommendationNumber;
use thiserror::Error;

/// Non-fatal problems found in the document structure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralWarning {
    /// No document title could be found on the scanned front pages
    #[error("Document title not found on the first {pages} page(s)")]
    TitleNotFound { pages: usize },

    /// No version line could be found on the scanned front pages
    #[error("Document version not found on the first {pages} page(s)")]
    VersionNotFound { pages: usize },

    /// A recommendation block carries no section label at all
    #[error("Recommendation {number} has no section labels; emitted with empty sections")]
    MalformedBlock { number: RecommendationNumber },

    /// A numbering line lower than its predecessor was skipped by the scanner
    #[error("Recommendation {number} appears after {previous}; skipped as out of order")]
    SkippedOutOfOrder {
        number: RecommendationNumber,
        previous: RecommendationNumber,
    },

    /// Two emitted recommendations share a number
    #[error("Recommendation {number} appears more than once")]
    DuplicateNumber { number: RecommendationNumber },

    /// Emitted recommendations are not in increasing order
    #[error("Recommendation {number} follows {previous} out of order")]
    OutOfOrder {
        number: RecommendationNumber,
        previous: RecommendationNumber,
    },
}

impl StructuralWarning {
    /// Number of the recommendation the warning is about, if any
    pub fn number(&self) -> Option<&RecommendationNumber> {
        match self {
            Self::TitleNotFound { .. } | Self::VersionNotFound { .. } => None,
            Self::MalformedBlock { number }
            | Self::SkippedOutOfOrder { number, .. }
            | Self::DuplicateNumber { number }
            | Self::OutOfOrder { number, .. } => Some(number),
        }
    }
}
