//! Final assembly of recommendation records

use super::section::SectionMap;
use super::title::DocumentMetadata;
use super::warning::StructuralWarning;
use super::{BoundaryMark, ProfileLevel, RecommendationNumber};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One recommendation of the benchmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub number: RecommendationNumber,
    #[serde(default)]
    pub level: ProfileLevel,
    pub title: String,
    #[serde(default)]
    pub sections: SectionMap,
}

/// Complete segmentation result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Benchmark {
    pub metadata: DocumentMetadata,
    /// Recommendations in document order
    pub recommendations: Vec<Recommendation>,
    /// Structural warnings from every stage, in the order they were found
    pub warnings: Vec<StructuralWarning>,
}

impl Benchmark {
    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    /// Look up a recommendation by its dotted number
    pub fn find(&self, number: &str) -> Option<&Recommendation> {
        let number = RecommendationNumber::parse(number)?;
        self.recommendations.iter().find(|r| r.number == number)
    }

    /// Warnings about one recommendation number
    pub fn warnings_for<'a>(
        &'a self,
        number: &'a RecommendationNumber,
    ) -> impl Iterator<Item = &'a StructuralWarning> + 'a {
        self.warnings
            .iter()
            .filter(move |w| w.number() == Some(number))
    }

    /// Warnings about the document as a whole (title, version)
    pub fn document_warnings(&self) -> impl Iterator<Item = &StructuralWarning> {
        self.warnings.iter().filter(|w| w.number().is_none())
    }
}

/// Pair boundaries with their sections and check the numbering
///
/// Duplicate or decreasing numbers produce warnings; every record is kept.
pub fn assemble(
    metadata: DocumentMetadata,
    blocks: Vec<(BoundaryMark, SectionMap)>,
    mut warnings: Vec<StructuralWarning>,
) -> Benchmark {
    let recommendations: Vec<Recommendation> = blocks
        .into_iter()
        .map(|(mark, sections)| Recommendation {
            number: mark.number,
            level: mark.level,
            title: mark.title,
            sections,
        })
        .collect();

    warnings.extend(numbering_warnings(&recommendations));

    Benchmark {
        metadata,
        recommendations,
        warnings,
    }
}

/// Check that numbers are unique and strictly increasing
fn numbering_warnings(recommendations: &[Recommendation]) -> Vec<StructuralWarning> {
    recommendations
        .iter()
        .tuple_windows()
        .filter_map(|(previous, current)| {
            if current.number == previous.number {
                Some(StructuralWarning::DuplicateNumber {
                    number: current.number.clone(),
                })
            } else if current.number < previous.number {
                Some(StructuralWarning::OutOfOrder {
                    number: current.number.clone(),
                    previous: previous.number.clone(),
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::SectionKind;

    fn block(number: &str, title: &str) -> (BoundaryMark, SectionMap) {
        let mut sections = SectionMap::new();
        sections.insert(SectionKind::ProfileApplicability, "Level 1");
        (
            BoundaryMark {
                offset: 0,
                number: RecommendationNumber::parse(number).unwrap(),
                level: ProfileLevel::Tier(1),
                title: title.to_string(),
            },
            sections,
        )
    }

    #[test]
    fn test_assemble_preserves_order_and_fields() {
        let benchmark = assemble(
            DocumentMetadata::default(),
            vec![block("1.1", "First"), block("1.2", "Second")],
            Vec::new(),
        );

        assert_eq!(benchmark.len(), 2);
        assert!(benchmark.warnings.is_empty());
        assert_eq!(benchmark.recommendations[1].title, "Second");
        assert_eq!(benchmark.find("1.1").unwrap().title, "First");
        assert!(benchmark.find("9.9").is_none());
    }

    #[test]
    fn test_duplicates_are_kept_and_flagged() {
        let benchmark = assemble(
            DocumentMetadata::default(),
            vec![block("1.1", "A"), block("1.1", "A"), block("1.2", "B")],
            Vec::new(),
        );

        assert_eq!(benchmark.len(), 3);
        assert_eq!(
            benchmark.warnings,
            vec![StructuralWarning::DuplicateNumber {
                number: RecommendationNumber::parse("1.1").unwrap()
            }]
        );
    }

    #[test]
    fn test_decreasing_numbers_are_flagged() {
        let benchmark = assemble(
            DocumentMetadata::default(),
            vec![block("2.1", "A"), block("1.5", "B")],
            vec![StructuralWarning::VersionNotFound { pages: 1 }],
        );

        assert_eq!(benchmark.warnings.len(), 2);
        assert!(matches!(
            benchmark.warnings[1],
            StructuralWarning::OutOfOrder { .. }
        ));
    }

    #[test]
    fn test_warnings_grouped_by_number() {
        let benchmark = assemble(
            DocumentMetadata::default(),
            vec![block("1.1", "A"), block("1.1", "A"), block("1.2", "B")],
            vec![StructuralWarning::TitleNotFound { pages: 1 }],
        );
        let duplicated = RecommendationNumber::parse("1.1").unwrap();
        let clean = RecommendationNumber::parse("1.2").unwrap();

        assert_eq!(benchmark.warnings_for(&duplicated).count(), 1);
        assert_eq!(benchmark.warnings_for(&clean).count(), 0);
        assert_eq!(
            benchmark.document_warnings().collect::<Vec<_>>(),
            vec![&StructuralWarning::TitleNotFound { pages: 1 }]
        );
    }
}
