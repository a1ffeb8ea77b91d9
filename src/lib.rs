//! # pathology-harvest
//!
//! Pull qualifying pathology reports out of a multi-report PDF and cross them
//! with a biobank inventory.
//!
//! A source PDF concatenates many free-text pathology reports. Each report
//! opens with a `Nº de muestra/biopsia` line. A report qualifies when it names
//! a six-digit patient number (NHC), a sample label, an intestinal anatomical
//! origin and a diagnosis, and states that no expression loss was detected
//! (`NO SE DETECTA pérdida`). Qualifying reports are written to a table and
//! optionally left-joined on NHC with a biobank spreadsheet.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate the path and %PDF magic
//!  ├─ 2. Text     read every page's text layer via pdfium
//!  ├─ 3. Segment  cut the line stream into one block per report
//!  ├─ 4. Parse    extract and validate the fields of each block
//!  ├─ 5. Write    accepted records → CSV
//!  └─ 6. Join     left join with the biobank dataset (optional)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pathology_harvest::{harvest, HarvestConfig, HarvestOutcome, HarvestPaths};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HarvestConfig::default();
//!     let paths = HarvestPaths::new("resultados.xlsx").with_biobank("biobanco.xlsx");
//!     match harvest("informes.pdf", &paths, &config)? {
//!         HarvestOutcome::NoQualifyingReports { .. } => eprintln!("nothing found"),
//!         HarvestOutcome::Exported { output, .. } => {
//!             eprintln!("{} reports", output.records.len())
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Extraction works on bare lines too, without pdfium:
//!
//! ```rust
//! use pathology_harvest::{extract_from_lines, HarvestConfig, RawLine};
//!
//! let lines = vec![
//!     RawLine::new(1, "Nº de muestra/biopsia: 22B-14462"),
//!     RawLine::new(1, "NHC: 124168"),
//!     RawLine::new(1, "- Procedencia anatómica: recto"),
//!     RawLine::new(1, "Diagnóstico: adenoma tubular"),
//!     RawLine::new(1, "NO SE DETECTA pérdida de expresión"),
//! ];
//! let output = extract_from_lines(&lines, &HarvestConfig::default());
//! assert_eq!(output.records[0].identifier(), "124168");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pathharvest` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## PDFium
//!
//! The text layer is read through pdfium. Set `PDFIUM_LIB_PATH` to the
//! library file or its directory; otherwise the system library is used.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod harvest;
pub mod observer;
pub mod output;
pub mod pipeline;
pub mod sink;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ColumnProjection, FieldCapture, HarvestConfig, HarvestConfigBuilder};
pub use error::{HarvestError, Rejection};
pub use harvest::{
    export, extract_from_lines, extract_records, harvest, join_with_biobank, write_records,
    HarvestOutcome, HarvestPaths, JoinSummary,
};
pub use observer::{ExtractionObserver, NoopObserver, SharedObserver};
pub use output::{ExtractionOutput, ExtractionStats, FieldTrace, RawLine, ReportRecord};
pub use sink::{BiobankRow, JoinedRecord, Table, BIOBANK_COLUMNS, RECORD_COLUMNS};
