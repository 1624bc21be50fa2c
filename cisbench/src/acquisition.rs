//! Raw page text acquisition
//!
//! Produces the document text as one string per page. PDFs go through
//! `pdf-extract`; `.txt` files are treated as already extracted, with pages
//! separated by form feeds.

use crate::converter_config::ConverterConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Page separator in pre-extracted text files
pub const PAGE_SEPARATOR: char = '\u{0c}';

/// Errors that abort a run before segmentation starts
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("IO error reading {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("PDF text extraction failed for {path}: {message}", path = .path.display())]
    ExtractionFailed { path: PathBuf, message: String },

    #[error("PDF text extraction panicked on {path} (malformed PDF?)", path = .0.display())]
    ExtractionPanicked(PathBuf),

    #[error("Unsupported input format: {path} (expected .pdf or .txt)", path = .0.display())]
    UnsupportedInput(PathBuf),
}

/// Kind of input file, from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    /// Pre-extracted text with form-feed page breaks
    Text,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Extract the text of every page of `path`, in order
///
/// # Parameters
/// * `path` - A `.pdf` document or a form-feed separated `.txt` file
///
/// # Returns
/// * `Ok(Vec<String>)` - One string per page
/// * `Err(AcquisitionError)` - File unreadable, extraction failed, or unsupported extension
pub fn extract_pages(path: &Path) -> Result<Vec<String>, AcquisitionError> {
    let kind = InputKind::from_path(path)
        .ok_or_else(|| AcquisitionError::UnsupportedInput(path.to_path_buf()))?;

    let pages = match kind {
        InputKind::Pdf => extract_pdf_pages(path)?,
        InputKind::Text => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| AcquisitionError::IoError(path.to_path_buf(), e))?;
            split_text_pages(&content)
        }
    };

    log::info!("Read {} pages from {}", pages.len(), path.display());
    Ok(pages)
}

/// Split pre-extracted text on form feeds
pub fn split_text_pages(content: &str) -> Vec<String> {
    content.split(PAGE_SEPARATOR).map(str::to_string).collect()
}

fn extract_pdf_pages(path: &Path) -> Result<Vec<String>, AcquisitionError> {
    let bytes = std::fs::read(path).map_err(|e| AcquisitionError::IoError(path.to_path_buf(), e))?;

    // pdf_extract can panic on malformed PDFs
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(AcquisitionError::ExtractionFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(_) => Err(AcquisitionError::ExtractionPanicked(path.to_path_buf())),
    }
}

/// Find the index of the page where recommendations begin
///
/// Searches from the configured `start_page` for the first page containing
/// the start marker and none of the rejection markers. Falls back to
/// `start_page` itself when no page qualifies; returns `pages.len()` when
/// `start_page` is past the end of the document.
pub fn locate_recommendations_start<S: AsRef<str>>(pages: &[S], config: &ConverterConfig) -> usize {
    let first = config.start_page.saturating_sub(1);
    if first >= pages.len() {
        log::warn!(
            "Start page {} is beyond the last page ({}); nothing to scan",
            config.start_page,
            pages.len()
        );
        return pages.len();
    }

    let found = pages[first..].iter().position(|page| {
        let text = page.as_ref();
        text.contains(config.start_marker.as_str())
            && !config
                .start_rejection_markers
                .iter()
                .any(|marker| !marker.is_empty() && text.contains(marker.as_str()))
    });

    match found {
        Some(offset) => {
            log::info!("Recommendations section detected on page {}", first + offset + 1);
            first + offset
        }
        None => {
            log::warn!(
                "No page after page {} contains '{}'; scanning from page {}",
                config.start_page,
                config.start_marker,
                config.start_page
            );
            first
        }
    }
}
