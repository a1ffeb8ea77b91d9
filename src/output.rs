//! Data model shared by the pipeline stages and the record sink.

use serde::Serialize;

/// One physical line of extracted document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLine {
    /// 1-indexed page the line was read from.
    pub page: u32,
    pub text: String,
}

impl RawLine {
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// An accepted pathology report.
///
/// Only [`crate::pipeline::report::ReportParser`] creates records, and only
/// once every field has been extracted and validated; there is no partial
/// record. Serialises with the column names downstream consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    #[serde(rename = "NHC")]
    identifier: String,
    #[serde(rename = "Muestra/Biopsia")]
    sample_id: String,
    #[serde(rename = "Procedencia")]
    origin: String,
    #[serde(rename = "Diagnostico")]
    diagnosis: String,
    #[serde(rename = "Resultado")]
    outcome: String,
    #[serde(rename = "Pagina")]
    page: u32,
}

impl ReportRecord {
    pub(crate) fn new(
        identifier: String,
        sample_id: String,
        origin: String,
        diagnosis: String,
        outcome: String,
        page: u32,
    ) -> Self {
        Self {
            identifier,
            sample_id,
            origin,
            diagnosis,
            outcome,
            page,
        }
    }

    /// Six-digit patient number (NHC).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }

    /// The canonical outcome phrase.
    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    /// Page of the block's opening (marker) line.
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Intermediate values pulled out of one block, emitted for diagnostics.
///
/// `origin` holds the origin only once it passed the allowed-prefix check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldTrace {
    pub page: u32,
    pub identifier: Option<String>,
    pub sample_id: Option<String>,
    pub origin: Option<String>,
    pub diagnosis: Option<String>,
    pub outcome_found: bool,
}

/// Counters for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Pages in the source document (0 when extracting from bare lines).
    pub total_pages: usize,
    pub total_lines: usize,
    /// Candidate blocks found by the segmenter.
    pub blocks: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub duration_ms: u64,
}

/// Result of an extraction run: accepted records in document order.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    pub records: Vec<ReportRecord>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
