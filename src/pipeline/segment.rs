//! Document segmentation: split the page-ordered line stream into one
//! candidate block per report.
//!
//! Each report in the source PDF starts with a `Nº de muestra/biopsia` line.
//! A block runs from one such marker line up to (not including) the next one,
//! or to the end of the document. Lines before the first marker belong to no
//! block and are dropped.

use crate::output::{RawLine, ReportRecord};
use crate::pipeline::fields::is_marker_line;
use crate::pipeline::report::ReportParser;
use tracing::debug;

/// A contiguous run of lines starting at a marker line.
///
/// Borrows from the line sequence it was cut from; never empty.
#[derive(Debug, Clone, Copy)]
pub struct CandidateBlock<'a> {
    lines: &'a [RawLine],
}

impl<'a> CandidateBlock<'a> {
    /// The block's lines, marker line first.
    pub fn lines(&self) -> &'a [RawLine] {
        self.lines
    }

    /// Page of the marker line.
    pub fn page(&self) -> u32 {
        self.lines[0].page
    }

    /// The block as a single line: raw lines joined by one space.
    pub fn flatten(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split `lines` into candidate blocks in document order.
///
/// No marker lines → no blocks.
pub fn segment(lines: &[RawLine]) -> Vec<CandidateBlock<'_>> {
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_marker_line(&line.text))
        .map(|(i, _)| i)
        .collect();

    let blocks: Vec<CandidateBlock<'_>> = starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(lines.len());
            CandidateBlock {
                lines: &lines[start..end],
            }
        })
        .collect();

    debug!(
        "Segmented {} lines into {} candidate blocks",
        lines.len(),
        blocks.len()
    );
    blocks
}

/// Parse every block independently, keeping accepted records in order.
pub fn parse_blocks(blocks: &[CandidateBlock<'_>], parser: &ReportParser) -> Vec<ReportRecord> {
    blocks.iter().filter_map(|block| parser.parse(block)).collect()
}

/// Segment `lines` and parse each block.
pub fn extract_records(lines: &[RawLine], parser: &ReportParser) -> Vec<ReportRecord> {
    parse_blocks(&segment(lines), parser)
}
