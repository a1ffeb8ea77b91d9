//! Top-level entry points: extract records from a PDF, write them, and join
//! them with the biobank dataset.
//!
//! [`harvest`] runs the whole flow. The other functions expose each step for
//! callers that already hold lines or records.

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::output::{ExtractionOutput, ExtractionStats, RawLine, ReportRecord};
use crate::pipeline::report::ReportParser;
use crate::pipeline::{input, segment, text};
use crate::sink::{self, BiobankRow};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Where a full run reads and writes.
#[derive(Debug, Clone)]
pub struct HarvestPaths {
    /// Accepted records are written here.
    pub results: PathBuf,
    /// Biobank dataset to join with. No join when None.
    pub biobank: Option<PathBuf>,
    /// Joined output. Defaults to [`HarvestPaths::default_joined`].
    pub joined: Option<PathBuf>,
}

impl HarvestPaths {
    pub fn new(results: impl Into<PathBuf>) -> Self {
        Self {
            results: results.into(),
            biobank: None,
            joined: None,
        }
    }

    pub fn with_biobank(mut self, biobank: impl Into<PathBuf>) -> Self {
        self.biobank = Some(biobank.into());
        self
    }

    pub fn with_joined(mut self, joined: impl Into<PathBuf>) -> Self {
        self.joined = Some(joined.into());
        self
    }

    /// `resultados.xlsx` → `resultadosfinal.xlsx`, in the same directory.
    pub fn default_joined(&self) -> PathBuf {
        let stem = self
            .results
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resultados".to_string());
        let ext = self
            .results
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "xlsx".to_string());
        self.results.with_file_name(format!("{stem}final.{ext}"))
    }

    fn joined_path(&self) -> PathBuf {
        self.joined.clone().unwrap_or_else(|| self.default_joined())
    }
}

/// Counters for one biobank join.
#[derive(Debug, Clone, Serialize)]
pub struct JoinSummary {
    pub output_path: PathBuf,
    pub biobank_rows: usize,
    /// Rows in the joined output (records repeat once per matching biobank row).
    pub joined_rows: usize,
    /// Records with at least one biobank match.
    pub matched_records: usize,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub enum HarvestOutcome {
    /// No block qualified. Nothing was written and the join did not run.
    NoQualifyingReports { stats: ExtractionStats },
    /// Records were written, and joined when a biobank was given.
    Exported {
        output: ExtractionOutput,
        results_path: PathBuf,
        join: Option<JoinSummary>,
    },
}

/// Extract accepted records from the PDF at `pdf_path`.
pub fn extract_records(
    pdf_path: impl AsRef<Path>,
    config: &HarvestConfig,
) -> Result<ExtractionOutput, HarvestError> {
    let start = Instant::now();
    let pdf_path = input::resolve_pdf(pdf_path)?;
    info!("Extracting reports from {}", pdf_path.display());

    let document = text::read_lines(&pdf_path, config.password.as_deref())?;
    let mut output = extract_from_lines(&document.lines, config);
    output.stats.total_pages = document.page_count;
    output.stats.duration_ms = start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Segment and parse an already extracted line sequence.
///
/// Pure with respect to `lines`: the same input always yields the same records.
pub fn extract_from_lines(lines: &[RawLine], config: &HarvestConfig) -> ExtractionOutput {
    let start = Instant::now();
    let parser = ReportParser::from_config(config);

    let blocks = segment::segment(lines);
    if let Some(ref observer) = config.observer {
        observer.on_segmentation_complete(lines.len(), blocks.len());
    }

    let records = segment::parse_blocks(&blocks, &parser);

    if let Some(ref observer) = config.observer {
        observer.on_extraction_complete(blocks.len(), records.len());
    }
    info!(
        "Extraction complete: {}/{} blocks accepted",
        records.len(),
        blocks.len()
    );

    let stats = ExtractionStats {
        total_pages: 0,
        total_lines: lines.len(),
        blocks: blocks.len(),
        accepted: records.len(),
        rejected: blocks.len() - records.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    ExtractionOutput { records, stats }
}

/// Write `records` to `path` (`.xlsx`, `.csv` or `.tsv` by extension).
pub fn write_records(records: &[ReportRecord], path: impl AsRef<Path>) -> Result<(), HarvestError> {
    let path = path.as_ref();
    sink::write_table(&sink::records_table(records), path)?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Left-join `records` with the biobank dataset and write the result.
///
/// A structural problem with the dataset aborts before anything is written.
pub fn join_with_biobank(
    records: &[ReportRecord],
    biobank_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &HarvestConfig,
) -> Result<JoinSummary, HarvestError> {
    let biobank_path = biobank_path.as_ref();
    let output_path = output_path.as_ref();

    let table = sink::read_table(biobank_path, config.biobank_sheet.as_deref())?;
    let biobank = sink::project_biobank(&table, config.projection, biobank_path)?;
    let joined = sink::left_join(records, &biobank);
    sink::write_table(&sink::joined_table(&joined), output_path)?;

    let summary = JoinSummary {
        output_path: output_path.to_path_buf(),
        biobank_rows: biobank.len(),
        joined_rows: joined.len(),
        matched_records: matched_records(records, &biobank),
    };
    info!(
        "Joined {} records with {} biobank rows ({} matched) into {}",
        records.len(),
        summary.biobank_rows,
        summary.matched_records,
        output_path.display()
    );
    Ok(summary)
}

fn matched_records(records: &[ReportRecord], biobank: &[BiobankRow]) -> usize {
    let keys: HashSet<&str> = biobank
        .iter()
        .filter_map(|row| row.identifier.as_deref().map(str::trim))
        .collect();
    records
        .iter()
        .filter(|r| keys.contains(r.identifier().trim()))
        .count()
}

/// Run the whole flow: extract, write results, then join if requested.
///
/// Zero accepted records short-circuits with
/// [`HarvestOutcome::NoQualifyingReports`]; no file is written.
pub fn harvest(
    pdf_path: impl AsRef<Path>,
    paths: &HarvestPaths,
    config: &HarvestConfig,
) -> Result<HarvestOutcome, HarvestError> {
    let output = extract_records(pdf_path, config)?;
    export(output, paths, config)
}

/// Write and join an extraction that has already run.
pub fn export(
    output: ExtractionOutput,
    paths: &HarvestPaths,
    config: &HarvestConfig,
) -> Result<HarvestOutcome, HarvestError> {
    if output.is_empty() {
        info!("No qualifying reports; nothing written");
        return Ok(HarvestOutcome::NoQualifyingReports {
            stats: output.stats,
        });
    }

    write_records(&output.records, &paths.results)?;

    let join = match &paths.biobank {
        Some(biobank) => {
            let joined_path = paths.joined_path();
            debug!("Joining with biobank {}", biobank.display());
            Some(join_with_biobank(
                &output.records,
                biobank,
                &joined_path,
                config,
            )?)
        }
        None => None,
    };

    Ok(HarvestOutcome::Exported {
        output,
        results_path: paths.results.clone(),
        join,
    })
}
