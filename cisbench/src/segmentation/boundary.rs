//! Recommendation boundary scanning
//!
//! Walks the normalized buffer once, line by line. A line that starts with
//! a dotted number (optionally followed by a `(Ln)` tier) is a candidate;
//! it becomes a boundary only when the first section label below it, within
//! a bounded window, is `Profile Applicability:`.
//!
//! ```text
//! SCANNING_FOR_NUMBER -> CANDIDATE_FOUND -> VALIDATED | REJECTED -> SCANNING_FOR_NUMBER
//!          |
//!          +-> TERMINAL (end of buffer or an end marker such as an appendix)
//! ```

use super::normalize::{strip_page_remnant, NormalizedBuffer};
use super::section::{match_label, Label, SectionKind};
use super::warning::StructuralWarning;
use super::{ProfileLevel, RecommendationNumber, SegmentationOptions};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Numbering line: `1.1.1 (L1) Ensure ...`
///
/// At least two components, so chapter headings like `1 Initial Setup`
/// never anchor a recommendation.
static ANCHOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)+)(?:\s+|$)(?:\((L\d+)\)\s*)?(.*)$").unwrap()
});

/// Whether `line` has the shape of a numbering line (`1.2 Title`, `1.1.1 (L1) ...`)
pub(crate) fn is_anchor_line(line: &str) -> bool {
    ANCHOR_LINE.is_match(line.trim())
}

/// Start of one recommendation block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryMark {
    /// Byte offset of the numbering line in the normalized buffer
    pub offset: usize,
    pub number: RecommendationNumber,
    pub level: ProfileLevel,
    /// Title text, including lines the layout wrapped before the first label
    pub title: String,
}

/// A validated numbering line that was dropped because it went backwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCandidate {
    pub offset: usize,
    pub number: RecommendationNumber,
}

/// Output of a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Accepted boundaries, strictly increasing in offset
    pub marks: Vec<BoundaryMark>,
    /// Out-of-order candidates; each still ends the block before it
    pub skipped: Vec<SkippedCandidate>,
    /// Offset just past the recommendation region
    pub end_offset: usize,
    pub warnings: Vec<StructuralWarning>,
}

impl ScanResult {
    /// Byte range of each block, aligned with `marks`
    ///
    /// A block runs from its mark to the next mark, the next skipped
    /// candidate, or the end of the region, whichever comes first.
    pub fn block_spans(&self) -> Vec<Range<usize>> {
        self.marks
            .iter()
            .enumerate()
            .map(|(i, mark)| {
                let next_mark = self
                    .marks
                    .get(i + 1)
                    .map_or(self.end_offset, |next| next.offset);
                let next_skipped = self
                    .skipped
                    .iter()
                    .map(|s| s.offset)
                    .find(|offset| *offset > mark.offset)
                    .unwrap_or(self.end_offset);
                let end = next_mark.min(next_skipped).min(self.end_offset);
                mark.offset..end.max(mark.offset)
            })
            .collect()
    }
}

/// Parsed numbering line, before validation
#[derive(Debug, Clone)]
struct Candidate<'b> {
    line_index: usize,
    offset: usize,
    number: RecommendationNumber,
    level: ProfileLevel,
    title: &'b str,
}

/// Why a candidate was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    /// Another label came before `Profile Applicability:`
    OtherLabelFirst(SectionKind),
    ExcludedLabelFirst,
    /// Another numbering line came first
    AnotherCandidate,
    EndMarker,
    /// The window ran out without any label
    NoApplicability,
}

enum Validation<'b> {
    Validated { continuation: Vec<&'b str> },
    Rejected(Rejection),
}

enum ScanState<'b> {
    ScanningForNumber,
    CandidateFound(Candidate<'b>),
    Terminal { end_offset: usize },
}

/// Single-pass scanner over a normalized buffer
pub struct BoundaryScanner<'a> {
    options: &'a SegmentationOptions,
}

impl<'a> BoundaryScanner<'a> {
    pub fn new(options: &'a SegmentationOptions) -> Self {
        Self { options }
    }

    /// Find every recommendation boundary in `buffer`
    pub fn scan(&self, buffer: &NormalizedBuffer) -> ScanResult {
        let lines = buffer.lines_with_offsets();
        let mut result = ScanResult::default();
        let mut last_accepted: Option<RecommendationNumber> = None;
        let mut index = 0;
        let mut state = ScanState::ScanningForNumber;

        loop {
            state = match state {
                ScanState::ScanningForNumber => match lines.get(index) {
                    None => ScanState::Terminal {
                        end_offset: buffer.len(),
                    },
                    Some((offset, line)) if self.is_end_marker(line) => {
                        log::info!("End of recommendations reached: {}", line.trim());
                        ScanState::Terminal {
                            end_offset: *offset,
                        }
                    }
                    Some((offset, line)) => match parse_candidate(index, *offset, line) {
                        Some(candidate) => ScanState::CandidateFound(candidate),
                        None => {
                            index += 1;
                            ScanState::ScanningForNumber
                        }
                    },
                },

                ScanState::CandidateFound(candidate) => {
                    match self.validate(&lines, candidate.line_index) {
                        Validation::Validated { continuation } => {
                            self.accept(candidate, continuation, &mut last_accepted, &mut result);
                        }
                        Validation::Rejected(reason) => {
                            log::debug!(
                                "Rejected candidate {} at offset {}: {:?}",
                                candidate.number,
                                candidate.offset,
                                reason
                            );
                        }
                    }
                    index += 1;
                    ScanState::ScanningForNumber
                }

                ScanState::Terminal { end_offset } => {
                    result.end_offset = end_offset;
                    break;
                }
            };
        }

        result
    }

    fn accept<'b>(
        &self,
        candidate: Candidate<'b>,
        continuation: Vec<&'b str>,
        last_accepted: &mut Option<RecommendationNumber>,
        result: &mut ScanResult,
    ) {
        if let Some(previous) = last_accepted.as_ref() {
            if candidate.number < *previous {
                result.warnings.push(StructuralWarning::SkippedOutOfOrder {
                    number: candidate.number.clone(),
                    previous: previous.clone(),
                });
                result.skipped.push(SkippedCandidate {
                    offset: candidate.offset,
                    number: candidate.number,
                });
                return;
            }
        }

        let title = std::iter::once(candidate.title)
            .chain(continuation)
            .map(|part| strip_page_remnant(part.trim()))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        *last_accepted = Some(candidate.number.clone());
        result.marks.push(BoundaryMark {
            offset: candidate.offset,
            number: candidate.number,
            level: candidate.level,
            title,
        });
    }

    /// Look below the candidate for its `Profile Applicability:` label
    fn validate<'b>(&self, lines: &[(usize, &'b str)], line_index: usize) -> Validation<'b> {
        let window_end = (line_index + 1 + self.options.applicability_lookahead).min(lines.len());
        let mut continuation = Vec::new();

        for (_, line) in &lines[line_index + 1..window_end] {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some((label, _)) = match_label(trimmed) {
                return match label {
                    Label::Section(SectionKind::ProfileApplicability) => {
                        Validation::Validated { continuation }
                    }
                    Label::Section(kind) => Validation::Rejected(Rejection::OtherLabelFirst(kind)),
                    Label::Excluded => Validation::Rejected(Rejection::ExcludedLabelFirst),
                };
            }
            if is_anchor_line(trimmed) {
                return Validation::Rejected(Rejection::AnotherCandidate);
            }
            if self.is_end_marker(trimmed) {
                return Validation::Rejected(Rejection::EndMarker);
            }
            continuation.push(trimmed);
        }

        Validation::Rejected(Rejection::NoApplicability)
    }

    fn is_end_marker(&self, line: &str) -> bool {
        let line = line.trim_start();
        self.options
            .end_markers
            .iter()
            .any(|marker| !marker.is_empty() && line.starts_with(marker.as_str()))
    }
}

/// Parse a numbering line into a candidate
fn parse_candidate(line_index: usize, offset: usize, line: &str) -> Option<Candidate<'_>> {
    let captures = ANCHOR_LINE.captures(line.trim())?;
    let number = RecommendationNumber::parse(captures.get(1)?.as_str())?;
    let level = captures
        .get(2)
        .and_then(|m| ProfileLevel::parse(m.as_str()))
        .unwrap_or_default();
    let title = captures.get(3).map_or("", |m| m.as_str());

    Some(Candidate {
        line_index,
        offset,
        number,
        level,
        title,
    })
}
