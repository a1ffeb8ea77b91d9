//! CLI binary for pathology-harvest.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `HarvestConfig` and `HarvestPaths` and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pathology_harvest::{
    extract_records, ColumnProjection, ExtractionObserver, FieldCapture, HarvestConfig,
    HarvestOutcome, HarvestPaths, Rejection, ReportRecord,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Spinner while the PDF text is read, then one bar tick per candidate block.
struct CliProgressObserver {
    bar: ProgressBar,
    verbose: bool,
    rejected: AtomicUsize,
}

impl CliProgressObserver {
    fn new(verbose: bool) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Reading");
        bar.set_message("Extracting PDF text…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            verbose,
            rejected: AtomicUsize::new(0),
        })
    }
}

impl ExtractionObserver for CliProgressObserver {
    fn on_segmentation_complete(&self, total_lines: usize, blocks: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>4}/{len} reports",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(blocks as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Parsing");
        self.bar.println(format!(
            "{} {}",
            dim("◆"),
            dim(&format!("{total_lines} lines, {blocks} candidate reports"))
        ));
    }

    fn on_block_rejected(&self, page: u32, rejection: &Rejection) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
        if self.verbose {
            self.bar.println(format!(
                "  {} page {:>3}  {}",
                yellow("·"),
                page,
                dim(&rejection.to_string())
            ));
        }
        self.bar.inc(1);
    }

    fn on_record_accepted(&self, record: &ReportRecord) {
        self.bar.println(format!(
            "  {} page {:>3}  NHC {}  {}",
            green("✓"),
            record.page(),
            bold(record.identifier()),
            dim(record.sample_id()),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, blocks: usize, accepted: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}/{} reports qualify  {}",
            if accepted > 0 { green("✔") } else { yellow("⚠") },
            bold(&accepted.to_string()),
            blocks,
            dim(&format!("({} rejected)", self.rejected.load(Ordering::SeqCst))),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract qualifying reports to resultados.xlsx
  pathharvest informes.pdf

  # Extract and join with the biobank inventory
  pathharvest informes.pdf --biobank biobancbdd.xlsx

  # Choose output files and the biobank worksheet
  pathharvest informes.pdf -o out/resultados.csv --biobank biobanco.xlsx \
      --sheet Inventario --joined out/final.csv

  # Select biobank columns by header name instead of position
  pathharvest informes.pdf --biobank biobanco.csv --by-name

  # Print accepted records as JSON (no progress bar)
  pathharvest informes.pdf --json

QUALIFYING REPORTS:
  A report starts at a "Nº de muestra/biopsia" line and qualifies when it has
  a 6-digit NHC, a sample label, an anatomical origin starting with colon,
  sigma, recto or intestino grueso, a diagnosis, and the phrase
  "NO SE DETECTA pérdida" (accents and case ignored).

BIOBANK DATASET:
  .csv, .tsv, .xlsx, .xlsm, .xlsb, .xls or .ods. The first nine columns are
  read as: HC, Fecha de obtención, Caja, Posición, NHC,
  Codificador Morfológico 1, Codificador Topográfico 1, Consentimiento, Órgano.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory); default: system library
  RUST_LOG          Override the log filter (e.g. pathology_harvest=debug)
"#;

/// Extract qualifying pathology reports from a PDF and join them with a biobank.
#[derive(Parser, Debug)]
#[command(
    name = "pathharvest",
    version,
    about = "Extract qualifying pathology reports from a PDF and join them with a biobank",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source PDF with concatenated pathology reports.
    input: PathBuf,

    /// Accepted records are written here (.xlsx, .csv or .tsv).
    #[arg(short, long, env = "PATHHARVEST_OUTPUT", default_value = "resultados.xlsx")]
    output: PathBuf,

    /// Biobank dataset to left-join on NHC.
    #[arg(long, env = "PATHHARVEST_BIOBANK")]
    biobank: Option<PathBuf>,

    /// Joined output file. Default: `<output stem>final.<ext>` beside --output.
    #[arg(long, env = "PATHHARVEST_JOINED", requires = "biobank")]
    joined: Option<PathBuf>,

    /// Worksheet to read from a biobank workbook. Default: the first sheet.
    #[arg(long, env = "PATHHARVEST_SHEET")]
    sheet: Option<String>,

    /// Select biobank columns by header name instead of by position.
    #[arg(long, env = "PATHHARVEST_BY_NAME")]
    by_name: bool,

    /// Stop free-text fields at the next report label instead of block end.
    #[arg(long, env = "PATHHARVEST_BOUNDED_FIELDS")]
    bounded_fields: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PATHHARVEST_PASSWORD")]
    password: Option<String>,

    /// Print accepted records as JSON on stdout.
    #[arg(long, env = "PATHHARVEST_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PATHHARVEST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PATHHARVEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PATHHARVEST_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(|| CliProgressObserver::new(cli.verbose));
    let config = build_config(&cli, progress)?;

    let mut paths = HarvestPaths::new(&cli.output);
    if let Some(ref biobank) = cli.biobank {
        paths = paths.with_biobank(biobank);
    }
    if let Some(ref joined) = cli.joined {
        paths = paths.with_joined(joined);
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let output = extract_records(&cli.input, &config)
        .with_context(|| format!("Failed to extract reports from {}", cli.input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output.records)
            .context("Failed to serialise records")?;
        println!("{json}");
    }

    let outcome = pathology_harvest::export(output, &paths, &config).context("Export failed")?;

    match outcome {
        HarvestOutcome::NoQualifyingReports { stats } => {
            eprintln!("No se encontraron informes que cumplan todos los criterios.");
            if !cli.quiet && !show_progress {
                eprintln!(
                    "  {} candidate reports in {} pages",
                    stats.blocks, stats.total_pages
                );
            }
        }
        HarvestOutcome::Exported {
            output,
            results_path,
            join,
        } => {
            if !cli.quiet {
                eprintln!(
                    "{}  {} reports  {}ms  →  {}",
                    green("✔"),
                    output.stats.accepted,
                    output.stats.duration_ms,
                    bold(&results_path.display().to_string()),
                );
                if let Some(join) = join {
                    eprintln!(
                        "{}  {}/{} matched in biobank ({} rows)  →  {}",
                        green("✔"),
                        join.matched_records,
                        output.stats.accepted,
                        join.biobank_rows,
                        bold(&join.output_path.display().to_string()),
                    );
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `HarvestConfig`.
fn build_config(cli: &Cli, progress: Option<Arc<CliProgressObserver>>) -> Result<HarvestConfig> {
    let mut builder = HarvestConfig::builder()
        .field_capture(if cli.bounded_fields {
            FieldCapture::NextLabel
        } else {
            FieldCapture::ToEnd
        })
        .projection(if cli.by_name {
            ColumnProjection::ByName
        } else {
            ColumnProjection::ByPosition
        });

    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(ref sheet) = cli.sheet {
        builder = builder.biobank_sheet(sheet);
    }
    if let Some(observer) = progress {
        builder = builder.observer(observer);
    }

    builder.build().context("Invalid configuration")
}
