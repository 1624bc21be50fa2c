//! Output formats for converted benchmarks
//!
//! Every format shares one column model: compliance status, number, level,
//! title, then one column per section in `SectionKind::ALL` order.

use crate::segmentation::{Recommendation, SectionKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod csv_exporter;
pub mod json_exporter;
pub mod xlsx_exporter;

/// Review state of a recommendation in an exported checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "Compliant")]
    Compliant,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
    #[default]
    #[serde(rename = "To Review")]
    ToReview,
}

impl ComplianceStatus {
    pub const ALL: [ComplianceStatus; 3] = [
        ComplianceStatus::Compliant,
        ComplianceStatus::NonCompliant,
        ComplianceStatus::ToReview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::NonCompliant => "Non-Compliant",
            ComplianceStatus::ToReview => "To Review",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while writing an output file
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Column headers shared by the tabular formats
pub fn headers() -> Vec<&'static str> {
    ["Compliance Status", "Number", "Level", "Title"]
        .into_iter()
        .chain(SectionKind::ALL.iter().map(|kind| kind.label()))
        .collect()
}

/// One table row for a recommendation, aligned with [`headers`]
pub fn record_row(recommendation: &Recommendation, status: ComplianceStatus) -> Vec<String> {
    let mut row = vec![
        status.to_string(),
        recommendation.number.to_string(),
        recommendation.level.to_string(),
        recommendation.title.clone(),
    ];
    row.extend(
        SectionKind::ALL
            .iter()
            .map(|kind| recommendation.sections.text(*kind).to_string()),
    );
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{ProfileLevel, RecommendationNumber, SectionMap};

    #[test]
    fn test_headers_order() {
        let headers = headers();
        assert_eq!(headers.len(), 13);
        assert_eq!(headers[0], "Compliance Status");
        assert_eq!(headers[4], "Profile Applicability");
        assert_eq!(headers[12], "Additional Information");
    }

    #[test]
    fn test_record_row_fills_missing_sections() {
        let mut sections = SectionMap::new();
        sections.insert(SectionKind::Audit, "Check it.");
        let recommendation = Recommendation {
            number: RecommendationNumber::parse("1.2.3").unwrap(),
            level: ProfileLevel::Tier(2),
            title: "Ensure Z".to_string(),
            sections,
        };

        let row = record_row(&recommendation, ComplianceStatus::ToReview);
        assert_eq!(row.len(), headers().len());
        assert_eq!(&row[..4], &["To Review", "1.2.3", "L2", "Ensure Z"]);
        assert_eq!(row[8], "Check it.");
        assert_eq!(row[5], "");
    }

    #[test]
    fn test_compliance_status_serde_names() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"Non-Compliant\"");
        let parsed: ComplianceStatus = serde_json::from_str("\"To Review\"").unwrap();
        assert_eq!(parsed, ComplianceStatus::ToReview);
    }
}
