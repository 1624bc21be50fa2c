//! Conversion pipeline
//!
//! Reads the page text of a benchmark and runs the segmentation core over
//! it. Only acquisition can fail here; structural problems come back as
//! warnings on the returned `Benchmark`.

use crate::acquisition::{self, AcquisitionError};
use crate::converter_config::ConverterConfig;
use crate::segmentation::{self, Benchmark};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error("Document has no pages: {path}", path = .0.display())]
    NoPages(PathBuf),
}

/// Read `path` and segment it into recommendations
///
/// # Parameters
/// * `path` - Benchmark document (`.pdf`, or `.txt` with form-feed page breaks)
/// * `config` - Converter configuration
///
/// # Returns
/// * `Ok(Benchmark)` - Segmentation result, possibly carrying warnings
/// * `Err(PipelineError)` - The document could not be read
pub fn convert_file(path: &Path, config: &ConverterConfig) -> Result<Benchmark, PipelineError> {
    let pages = acquisition::extract_pages(path)?;
    if pages.is_empty() {
        return Err(PipelineError::NoPages(path.to_path_buf()));
    }
    Ok(convert_pages(&pages, config))
}

/// Segment already extracted pages
///
/// The first `title_scan_pages` pages feed title detection; the
/// recommendations region starts at the page found by
/// [`acquisition::locate_recommendations_start`].
pub fn convert_pages<S: AsRef<str>>(pages: &[S], config: &ConverterConfig) -> Benchmark {
    let front_end = config.title_scan_pages.min(pages.len());
    let region_start = acquisition::locate_recommendations_start(pages, config);

    log::info!(
        "Scanning pages {}..={} for recommendations",
        region_start + 1,
        pages.len()
    );

    segmentation::segment(
        &pages[..front_end],
        &pages[region_start..],
        &config.segmentation_options(),
    )
}
