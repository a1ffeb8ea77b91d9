//! Error types for the pathology-harvest library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`HarvestError`] is **fatal**: the run cannot proceed (missing input
//!   file, unreadable PDF, malformed biobank spreadsheet). Returned as
//!   `Err(HarvestError)` from the top-level `harvest*` / `extract*` functions.
//!
//! * [`Rejection`] is **non-fatal**: one candidate report block failed an
//!   extraction or validation rule. Rejections never escape as errors; they
//!   are handed to the configured [`crate::observer::ExtractionObserver`] and
//!   logged, and processing continues with the next block.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pathology-harvest library.
#[derive(Debug, Error)]
pub enum HarvestError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render could not produce the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: u32, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH to the directory (or file) containing libpdfium,\n\
or install pdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Tabular errors ────────────────────────────────────────────────────
    /// The file extension does not name a supported tabular format.
    #[error("Unsupported table format for '{path}' (expected .csv, .tsv, .xlsx, .xlsm, .xlsb, .xls or .ods)")]
    UnsupportedTableFormat { path: PathBuf },

    /// The spreadsheet or CSV could not be parsed.
    #[error("Failed to read table '{path}': {detail}")]
    TableReadFailed { path: PathBuf, detail: String },

    /// The workbook contains no worksheets.
    #[error("Workbook '{path}' contains no sheets")]
    EmptyWorkbook { path: PathBuf },

    /// The requested worksheet does not exist.
    #[error("Sheet '{sheet}' not found in '{path}'")]
    SheetNotFound { path: PathBuf, sheet: String },

    /// The biobank dataset has fewer columns than the positional projection needs.
    #[error("Biobank file '{path}' has {found} columns; the projection requires at least {required}")]
    MissingBiobankColumns {
        path: PathBuf,
        found: usize,
        required: usize,
    },

    /// A column required by the by-name projection is absent.
    #[error("Biobank file '{path}' has no column named '{column}'")]
    MissingBiobankColumn { path: PathBuf, column: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The output extension names a read-only format.
    #[error("Cannot write '{path}': output must be .csv, .tsv or .xlsx")]
    UnsupportedOutputFormat { path: PathBuf },

    /// Could not create, write or persist an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a candidate block did not become a [`crate::output::ReportRecord`].
///
/// Variants are ordered the way the parser checks them, except that
/// `InvalidOrigin` is checked first: an origin that is present but outside the
/// allowed set rejects the report outright, while an absent origin only fails
/// the final completeness check.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum Rejection {
    /// No `NHC` label followed by six digits.
    #[error("no 6-digit NHC found")]
    MissingIdentifier,

    /// The sample/biopsy label had no value after it.
    #[error("no sample/biopsy label value")]
    MissingSampleId,

    /// The anatomical origin does not start with an allowed site.
    #[error("origin '{origin}' is not colon, sigma, recto or intestino grueso")]
    InvalidOrigin { origin: String },

    /// No anatomical origin label in the block.
    #[error("no anatomical origin found")]
    MissingOrigin,

    /// No diagnosis label, or an empty diagnosis.
    #[error("no diagnosis found")]
    MissingDiagnosis,

    /// The outcome phrase does not appear anywhere in the block.
    #[error("outcome phrase not present")]
    OutcomeNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_display() {
        let e = HarvestError::MissingBiobankColumns {
            path: PathBuf::from("biobanc.xlsx"),
            found: 4,
            required: 9,
        };
        let msg = e.to_string();
        assert!(msg.contains("4 columns"), "got: {msg}");
        assert!(msg.contains("at least 9"), "got: {msg}");
    }

    #[test]
    fn invalid_origin_names_the_value() {
        let r = Rejection::InvalidOrigin {
            origin: "estómago.".into(),
        };
        assert!(r.to_string().contains("estómago."));
    }

    #[test]
    fn text_extraction_display() {
        let e = HarvestError::TextExtractionFailed {
            page: 7,
            detail: "no text layer".into(),
        };
        assert!(e.to_string().contains("page 7"));
        assert!(e.to_string().contains("no text layer"));
    }

    #[test]
    fn rejection_round_trips_through_json() {
        let json = serde_json::to_string(&Rejection::MissingOrigin).unwrap();
        let back: Rejection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rejection::MissingOrigin);
    }
}
