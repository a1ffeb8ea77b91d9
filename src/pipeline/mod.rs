//! Pipeline stages for turning a pathology PDF into report records.
//!
//! Each submodule implements exactly one transformation step and is testable
//! on its own; only [`text`] touches pdfium.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ text ──▶ segment ──▶ report ──▶ records
//! (path)   (pdfium)  (markers)   (rules)
//!                                  │
//!                        fields + normalize
//! ```
//!
//! 1. [`input`]: validate the PDF path and magic bytes
//! 2. [`text`]: read each page's text layer into `(page, line)` pairs
//! 3. [`segment`]: cut the line stream at `Nº de muestra/biopsia` markers
//! 4. [`report`]: extract and validate the fields of one block
//! 5. [`fields`]: the label patterns and first-match extraction
//! 6. [`normalize`]: accent/case-insensitive comparison and line cleanup

pub mod fields;
pub mod input;
pub mod normalize;
pub mod report;
pub mod segment;
pub mod text;
