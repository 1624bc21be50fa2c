//! Pipe-delimited text export

use super::{headers, record_row, ComplianceStatus, ExportError};
use crate::segmentation::Benchmark;
use std::io::Write;
use std::path::Path;

/// Field delimiter
pub const DELIMITER: u8 = b'|';

/// Export a benchmark to a pipe-delimited file
///
/// Layout: title row, version row, an empty row, the header row, then one
/// row per recommendation.
///
/// # Parameters
/// * `benchmark` - Segmentation result to export
/// * `output_path` - Path where the file will be written
pub fn to_csv(benchmark: &Benchmark, output_path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(output_path)?;
    write_csv(benchmark, file)?;
    log::info!(
        "Wrote {} recommendations to {}",
        benchmark.len(),
        output_path.display()
    );
    Ok(())
}

/// Write the pipe-delimited form to any writer
pub fn write_csv<W: Write>(benchmark: &Benchmark, writer: W) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_writer(writer);

    writer.write_record([benchmark.metadata.display_title()])?;
    writer.write_record([benchmark.metadata.display_version()])?;
    writer.write_record([""])?;
    writer.write_record(headers())?;

    for recommendation in &benchmark.recommendations {
        writer.write_record(record_row(recommendation, ComplianceStatus::ToReview))?;
    }

    writer.flush()?;
    Ok(())
}
