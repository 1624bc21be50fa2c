//! Section splitting for a single recommendation block
//!
//! A block is the text from one numbering line up to the next boundary.
//! Labels such as `Description:` start a named section; everything up to
//! the next label belongs to it. `CIS Controls:` is recognized only so
//! that its body can be dropped. A numbering-shaped line that did not
//! start a recommendation (a chapter heading such as `1.2 Configure
//! Software Updates`) closes the open section, and its intro text is
//! dropped as well.

use super::boundary::is_anchor_line;
use super::warning::StructuralWarning;
use super::BoundaryMark;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label whose content never reaches the output
pub const EXCLUDED_LABEL: &str = "CIS Controls";

/// Named sections of a recommendation, in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    ProfileApplicability,
    Description,
    Rationale,
    Impact,
    Audit,
    Remediation,
    DefaultValue,
    References,
    AdditionalInformation,
}

impl SectionKind {
    /// Every section in column order
    pub const ALL: [SectionKind; 9] = [
        SectionKind::ProfileApplicability,
        SectionKind::Description,
        SectionKind::Rationale,
        SectionKind::Impact,
        SectionKind::Audit,
        SectionKind::Remediation,
        SectionKind::DefaultValue,
        SectionKind::References,
        SectionKind::AdditionalInformation,
    ];

    /// Heading text as printed in the document, without the colon
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::ProfileApplicability => "Profile Applicability",
            SectionKind::Description => "Description",
            SectionKind::Rationale => "Rationale",
            SectionKind::Impact => "Impact",
            SectionKind::Audit => "Audit",
            SectionKind::Remediation => "Remediation",
            SectionKind::DefaultValue => "Default Value",
            SectionKind::References => "References",
            SectionKind::AdditionalInformation => "Additional Information",
        }
    }
}

/// A recognized label at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Section(SectionKind),
    Excluded,
}

/// Match a section label at the start of `line`
///
/// Labels are case-sensitive and must be followed by a colon. Returns the
/// label and whatever text follows the colon on the same line.
pub fn match_label(line: &str) -> Option<(Label, &str)> {
    let line = line.trim_start();
    let candidates = SectionKind::ALL
        .iter()
        .map(|kind| (Label::Section(*kind), kind.label()))
        .chain(std::iter::once((Label::Excluded, EXCLUDED_LABEL)));

    for (label, text) in candidates {
        if let Some(rest) = line.strip_prefix(text).and_then(|r| r.strip_prefix(':')) {
            return Some((label, rest.trim()));
        }
    }
    None
}

/// Mapping from section to its text
///
/// Only sections whose label appeared in the block are present; a label
/// with no body maps to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionMap(BTreeMap<SectionKind, String>);

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of a section, if its label was present
    pub fn get(&self, kind: SectionKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    /// Text of a section, empty when absent
    pub fn text(&self, kind: SectionKind) -> &str {
        self.get(kind).unwrap_or("")
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn insert(&mut self, kind: SectionKind, text: impl Into<String>) {
        self.0.insert(kind, text.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate present sections in column order
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &str)> {
        self.0.iter().map(|(kind, text)| (*kind, text.as_str()))
    }
}

impl FromIterator<(SectionKind, String)> for SectionMap {
    fn from_iter<T: IntoIterator<Item = (SectionKind, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of splitting one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSplit {
    pub sections: SectionMap,
    /// Set when the block had no label at all
    pub warning: Option<StructuralWarning>,
}

/// Splitter state while walking the lines of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    /// Before the first label; text here is boilerplate (wrapped title lines)
    Leading,
    Active(SectionKind),
    /// Inside the excluded category, or below a chapter heading
    Discarding,
}

/// Paragraph-aware text accumulator for one section
#[derive(Debug, Default)]
struct SectionText {
    paragraphs: Vec<String>,
    current: String,
}

impl SectionText {
    fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            self.break_paragraph();
            return;
        }
        if !self.current.is_empty() {
            self.current.push(' ');
        }
        self.current.push_str(line);
    }

    fn break_paragraph(&mut self) {
        if !self.current.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> String {
        self.break_paragraph();
        self.paragraphs.join("\n")
    }
}

/// Split a recommendation block into its named sections
///
/// # Parameters
/// * `block` - Block text starting at the numbering line
/// * `mark` - Boundary that opened the block (used for warnings)
///
/// # Returns
/// * `SectionSplit` - Sections found, plus a `MalformedBlock` warning when
///   the block has no label at all
pub fn split_sections(block: &str, mark: &BoundaryMark) -> SectionSplit {
    let mut state = SplitState::Leading;
    let mut texts: BTreeMap<SectionKind, SectionText> = BTreeMap::new();
    let mut saw_label = false;

    // The numbering line itself never belongs to a section
    for line in block.lines().skip(1) {
        if let Some((label, rest)) = match_label(line) {
            saw_label = true;
            state = match label {
                Label::Section(kind) => {
                    let text = texts.entry(kind).or_default();
                    text.break_paragraph();
                    text.push_line(rest);
                    SplitState::Active(kind)
                }
                Label::Excluded => SplitState::Discarding,
            };
            continue;
        }

        if is_anchor_line(line) {
            state = SplitState::Discarding;
            continue;
        }

        if let SplitState::Active(kind) = state {
            texts.entry(kind).or_default().push_line(line);
        }
    }

    let sections = texts
        .into_iter()
        .map(|(kind, text)| (kind, text.finish()))
        .collect();

    let warning = (!saw_label).then(|| StructuralWarning::MalformedBlock {
        number: mark.number.clone(),
    });

    SectionSplit { sections, warning }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{ProfileLevel, RecommendationNumber};

    fn mark(number: &str) -> BoundaryMark {
        BoundaryMark {
            offset: 0,
            number: RecommendationNumber::parse(number).unwrap(),
            level: ProfileLevel::Tier(1),
            title: "Ensure X is configured".to_string(),
        }
    }

    #[test]
    fn test_match_label() {
        assert_eq!(
            match_label("Description:"),
            Some((Label::Section(SectionKind::Description), ""))
        );
        assert_eq!(
            match_label("Default Value: Disabled"),
            Some((Label::Section(SectionKind::DefaultValue), "Disabled"))
        );
        assert_eq!(match_label("CIS Controls:"), Some((Label::Excluded, "")));
        assert_eq!(match_label("description:"), None);
        assert_eq!(match_label("Description of the change"), None);
        assert_eq!(match_label("The Audit: step"), None);
    }

    #[test]
    fn test_split_basic_block() {
        let block = "1.1.1 (L1) Ensure X is configured\nProfile Applicability:\nLevel 1\nDescription:\nDo the thing.\nRationale:\nBecause.\nCIS Controls:\nv8 1.1\n";
        let split = split_sections(block, &mark("1.1.1"));

        assert!(split.warning.is_none());
        assert_eq!(split.sections.len(), 3);
        assert_eq!(split.sections.text(SectionKind::ProfileApplicability), "Level 1");
        assert_eq!(split.sections.text(SectionKind::Description), "Do the thing.");
        assert_eq!(split.sections.text(SectionKind::Rationale), "Because.");
        assert!(!split.sections.contains(SectionKind::References));
    }

    #[test]
    fn test_excluded_section_is_dropped_until_next_label() {
        let block = "1.2.3 Title\nProfile Applicability:\nLevel 2\nCIS Controls:\nControl Version 8\n3.3 Configure Data Access\nReferences:\n1. https://example.com\n";
        let split = split_sections(block, &mark("1.2.3"));

        assert_eq!(split.sections.text(SectionKind::References), "1. https://example.com");
        assert!(split
            .sections
            .iter()
            .all(|(_, text)| !text.contains("Control Version")));
    }

    #[test]
    fn test_chapter_heading_closes_references() {
        let block = "1.1.9 (L1) Ensure A\nProfile Applicability:\nLevel 1\nReferences:\nhttps://example.com\n\n1.2 Configure Software Updates\nPatch management procedures may vary by site.\n";
        let split = split_sections(block, &mark("1.1.9"));

        assert_eq!(
            split.sections.text(SectionKind::References),
            "https://example.com"
        );
        assert!(split
            .sections
            .iter()
            .all(|(_, text)| !text.contains("Patch management")));
    }

    #[test]
    fn test_chapter_heading_closes_additional_information() {
        let block = "2.1.4 Ensure B\nProfile Applicability:\nLevel 2\nAdditional Information:\nApplies to all editions.\n2.2 Special Purpose Services\nThis section describes services that are not needed.\n";
        let split = split_sections(block, &mark("2.1.4"));

        assert_eq!(
            split.sections.text(SectionKind::AdditionalInformation),
            "Applies to all editions."
        );
    }

    #[test]
    fn test_label_after_chapter_heading_resumes_collection() {
        let block = "3.1.1 Ensure C\nProfile Applicability:\nLevel 1\n3.2 Stray heading\nintro\nAudit:\nCheck it.\n";
        let split = split_sections(block, &mark("3.1.1"));

        assert_eq!(split.sections.text(SectionKind::ProfileApplicability), "Level 1");
        assert_eq!(split.sections.text(SectionKind::Audit), "Check it.");
    }

    #[test]
    fn test_wrapped_lines_and_paragraphs() {
        let block = "1.1.1 Title\nProfile Applicability:\nLevel 1\nAudit:\nRun the following\ncommand:\n\n# grep foo /etc/bar\n";
        let split = split_sections(block, &mark("1.1.1"));

        assert_eq!(
            split.sections.text(SectionKind::Audit),
            "Run the following command:\n# grep foo /etc/bar"
        );
    }

    #[test]
    fn test_leading_text_before_first_label_is_discarded() {
        let block = "1.1.1 (L1) Ensure a very long title that\nwraps onto a second line (Automated)\nProfile Applicability:\nLevel 1\n";
        let split = split_sections(block, &mark("1.1.1"));

        assert_eq!(split.sections.len(), 1);
        assert_eq!(split.sections.text(SectionKind::ProfileApplicability), "Level 1");
    }

    #[test]
    fn test_label_without_body_is_present_and_empty() {
        let block = "1.1.1 Title\nProfile Applicability:\nLevel 1\nImpact:\nAudit:\nCheck it.";
        let split = split_sections(block, &mark("1.1.1"));

        assert_eq!(split.sections.get(SectionKind::Impact), Some(""));
        assert_eq!(split.sections.text(SectionKind::Audit), "Check it.");
    }

    #[test]
    fn test_repeated_label_appends() {
        let block = "1.1.1 Title\nProfile Applicability:\nLevel 1\nAudit:\nFirst.\nAudit:\nSecond.";
        let split = split_sections(block, &mark("1.1.1"));

        assert_eq!(split.sections.text(SectionKind::Audit), "First.\nSecond.");
    }

    #[test]
    fn test_block_without_labels_is_malformed() {
        let block = "4.1.1 (L1) Ensure something\nJust some prose with no labels.\n";
        let split = split_sections(block, &mark("4.1.1"));

        assert!(split.sections.is_empty());
        assert_eq!(
            split.warning,
            Some(StructuralWarning::MalformedBlock {
                number: RecommendationNumber::parse("4.1.1").unwrap()
            })
        );
    }

    #[test]
    fn test_section_map_serializes_snake_case_keys() {
        let mut map = SectionMap::new();
        map.insert(SectionKind::DefaultValue, "Disabled");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"default_value":"Disabled"}"#);
    }
}
