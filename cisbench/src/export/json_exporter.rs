//! JSON export
//!
//! ```json
//! {
//!   "title": "CIS Example Benchmark",
//!   "version": "v1.0.0 - 01-02-2024",
//!   "recommendations": [
//!     { "compliance_status": "To Review", "number": "1.1.1", "level": "L1",
//!       "title": "Ensure ...", "sections": { "description": "..." } }
//!   ]
//! }
//! ```

use super::{ComplianceStatus, ExportError};
use crate::segmentation::{Benchmark, DocumentMetadata, Recommendation};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Serialize)]
struct JsonDocumentRef<'a> {
    #[serde(flatten)]
    metadata: &'a DocumentMetadata,
    recommendations: Vec<JsonRecommendationRef<'a>>,
}

#[derive(Serialize)]
struct JsonRecommendationRef<'a> {
    compliance_status: ComplianceStatus,
    #[serde(flatten)]
    recommendation: &'a Recommendation,
}

#[derive(Deserialize)]
struct JsonDocument {
    #[serde(flatten)]
    metadata: DocumentMetadata,
    recommendations: Vec<JsonRecommendation>,
}

#[derive(Deserialize)]
struct JsonRecommendation {
    #[serde(default)]
    #[allow(dead_code)]
    compliance_status: ComplianceStatus,
    #[serde(flatten)]
    recommendation: Recommendation,
}

/// Export a benchmark to a pretty-printed JSON file
pub fn to_json(benchmark: &Benchmark, output_path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(output_path)?;
    write_json(benchmark, std::io::BufWriter::new(file))?;
    log::info!(
        "Wrote {} recommendations to {}",
        benchmark.len(),
        output_path.display()
    );
    Ok(())
}

/// Write the JSON form to any writer
pub fn write_json<W: Write>(benchmark: &Benchmark, mut writer: W) -> Result<(), ExportError> {
    let document = JsonDocumentRef {
        metadata: &benchmark.metadata,
        recommendations: benchmark
            .recommendations
            .iter()
            .map(|recommendation| JsonRecommendationRef {
                compliance_status: ComplianceStatus::ToReview,
                recommendation,
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a file written by [`write_json`] back into a benchmark
///
/// Warnings are not part of the format, so the result carries none.
pub fn read_json<R: Read>(reader: R) -> Result<Benchmark, ExportError> {
    let document: JsonDocument = serde_json::from_reader(reader)?;
    Ok(Benchmark {
        metadata: document.metadata,
        recommendations: document
            .recommendations
            .into_iter()
            .map(|r| r.recommendation)
            .collect(),
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{ProfileLevel, RecommendationNumber, SectionKind, SectionMap};

    fn recommendation(number: &str, level: ProfileLevel) -> Recommendation {
        let mut sections = SectionMap::new();
        sections.insert(SectionKind::ProfileApplicability, "Level 1 - Server");
        sections.insert(SectionKind::Impact, "");
        sections.insert(SectionKind::Audit, "Run:\n# stat /etc/passwd");
        Recommendation {
            number: RecommendationNumber::parse(number).unwrap(),
            level,
            title: format!("Ensure \"{}\" is set", number),
            sections,
        }
    }

    #[test]
    fn test_json_round_trip() {
        let benchmark = Benchmark {
            metadata: DocumentMetadata {
                title: Some("CIS Test Benchmark".to_string()),
                version: Some("v1.0.0".to_string()),
            },
            recommendations: vec![
                recommendation("1.1.1", ProfileLevel::Tier(1)),
                recommendation("1.1.10", ProfileLevel::Unspecified),
            ],
            warnings: Vec::new(),
        };

        let mut out = Vec::new();
        write_json(&benchmark, &mut out).unwrap();
        let parsed = read_json(out.as_slice()).unwrap();

        assert_eq!(parsed, benchmark);
    }

    #[test]
    fn test_json_shape() {
        let benchmark = Benchmark {
            metadata: DocumentMetadata::default(),
            recommendations: vec![recommendation("2.1", ProfileLevel::Tier(2))],
            warnings: Vec::new(),
        };

        let mut out = Vec::new();
        write_json(&benchmark, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert!(value["title"].is_null());
        let first = &value["recommendations"][0];
        assert_eq!(first["compliance_status"], "To Review");
        assert_eq!(first["number"], "2.1");
        assert_eq!(first["level"], "L2");
        assert_eq!(first["sections"]["impact"], "");
        assert!(first["sections"].get("references").is_none());
    }

    #[test]
    fn test_read_json_rejects_bad_number() {
        let input = r#"{"title":null,"version":null,"recommendations":[{"number":"1..2","level":"","title":"x","sections":{}}]}"#;
        assert!(matches!(
            read_json(input.as_bytes()),
            Err(ExportError::JsonError(_))
        ));
    }
}
