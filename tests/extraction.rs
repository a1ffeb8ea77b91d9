//! Integration tests for report extraction on line sequences.
//!
//! These drive the public API without pdfium: the `(page, line)` stream is
//! built by hand, exactly as `pipeline::text::read_lines` would produce it.

use pathology_harvest::pipeline::segment::segment;
use pathology_harvest::{
    extract_from_lines, ExtractionObserver, FieldCapture, FieldTrace, HarvestConfig, RawLine,
    Rejection, ReportRecord,
};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn page(n: u32, lines: &[&str]) -> Vec<RawLine> {
    lines.iter().map(|l| RawLine::new(n, *l)).collect()
}

fn scenario_a() -> Vec<RawLine> {
    page(
        3,
        &[
            "Nº de muestra/biopsia: 22B-14462",
            "NHC: 124168",
            "- Procedencia anatómica: intestino grueso.",
            "Diagnóstico: adenocarcinoma.",
            "NO SE DETECTA pérdida de expresión",
        ],
    )
}

fn records(lines: &[RawLine]) -> Vec<ReportRecord> {
    extract_from_lines(lines, &HarvestConfig::default()).records
}

#[derive(Default)]
struct Recorder {
    traces: Mutex<Vec<FieldTrace>>,
    rejections: Mutex<Vec<(u32, Rejection)>>,
}

impl ExtractionObserver for Recorder {
    fn on_fields_extracted(&self, trace: &FieldTrace) {
        self.traces.lock().unwrap().push(trace.clone());
    }

    fn on_block_rejected(&self, page: u32, rejection: &Rejection) {
        self.rejections.lock().unwrap().push((page, rejection.clone()));
    }
}

fn observed(lines: &[RawLine]) -> (Vec<ReportRecord>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let config = HarvestConfig::builder()
        .observer(recorder.clone())
        .build()
        .unwrap();
    (extract_from_lines(lines, &config).records, recorder)
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn scenario_a_yields_one_record() {
    let out = records(&scenario_a());
    assert_eq!(out.len(), 1);

    let rec = &out[0];
    assert_eq!(rec.identifier(), "124168");
    assert!(rec.origin().to_lowercase().starts_with("intestino grueso"));
    assert_eq!(rec.outcome(), "NO SE DETECTA pérdida");
    assert_eq!(rec.page(), 3);
    assert!(rec.sample_id().starts_with("22B-14462"));
    assert!(rec.diagnosis().starts_with("adenocarcinoma"));
}

#[test]
fn scenario_b_disallowed_origin_rejects() {
    let mut lines = scenario_a();
    lines[2] = RawLine::new(3, "- Procedencia anatómica: estómago.");

    let (out, recorder) = observed(&lines);
    assert!(out.is_empty());

    let rejections = recorder.rejections.lock().unwrap();
    assert_eq!(rejections.len(), 1);
    assert!(matches!(&rejections[0], (3, Rejection::InvalidOrigin { origin }) if origin.starts_with("estómago")));
    // Invalid origin stops the block before the field trace.
    assert!(recorder.traces.lock().unwrap().is_empty());
}

#[test]
fn scenario_c_missing_outcome_rejects() {
    let mut lines = scenario_a();
    lines.pop();

    let (out, recorder) = observed(&lines);
    assert!(out.is_empty());
    assert_eq!(
        recorder.rejections.lock().unwrap().as_slice(),
        &[(3, Rejection::OutcomeNotFound)]
    );

    let traces = recorder.traces.lock().unwrap();
    assert_eq!(traces.len(), 1);
    assert!(!traces[0].outcome_found);
}

#[test]
fn absent_origin_is_rejected_for_a_different_reason() {
    let mut lines = scenario_a();
    lines.remove(2);

    let (out, recorder) = observed(&lines);
    assert!(out.is_empty());
    assert_eq!(
        recorder.rejections.lock().unwrap().as_slice(),
        &[(3, Rejection::MissingOrigin)]
    );
    assert!(recorder.traces.lock().unwrap()[0].origin.is_none());
}

#[test]
fn short_identifier_gives_no_record() {
    let mut lines = scenario_a();
    lines[1] = RawLine::new(3, "NHC: 12416");
    let (out, recorder) = observed(&lines);
    assert!(out.is_empty());
    assert_eq!(
        recorder.rejections.lock().unwrap().as_slice(),
        &[(3, Rejection::MissingIdentifier)]
    );
}

#[test]
fn outcome_phrase_matches_without_accents_or_case() {
    let mut lines = scenario_a();
    lines[4] = RawLine::new(3, "no se detecta perdida de expresion de MLH1");
    assert_eq!(records(&lines).len(), 1);
}

// ── Segmentation ─────────────────────────────────────────────────────────────

#[test]
fn zero_markers_zero_records() {
    let lines = page(1, &["NHC: 124168", "Diagnóstico: adenoma", "NO SE DETECTA pérdida"]);
    assert!(segment(&lines).is_empty());
    assert!(records(&lines).is_empty());
    assert!(records(&[]).is_empty());
}

#[test]
fn reports_across_pages_keep_order_and_marker_page() {
    let mut lines = page(1, &["Servicio de Anatomía Patológica", "Informe de resultados"]);
    lines.extend(scenario_a().into_iter().map(|l| RawLine::new(1, l.text)));
    lines.extend(page(
        2,
        &[
            "Nº de muestra/biopsia: 22B-20001",
            "NHC: 765432",
            "- Procedencia anatómica: sigma",
        ],
    ));
    lines.extend(page(
        3,
        &["Diagnóstico: adenoma tubular", "NO SE DETECTA pérdida de expresión"],
    ));
    // A rejected report in between must not affect its neighbours.
    lines.extend(page(
        3,
        &[
            "Nº de muestra/biopsia: 22B-20002",
            "NHC: 111111",
            "- Procedencia anatómica: estómago",
            "Diagnóstico: gastritis",
            "NO SE DETECTA pérdida",
        ],
    ));
    lines.extend(page(
        4,
        &[
            "Nº de muestra/biopsia: 22B-20003",
            "NHC: 222222",
            "- Procedencia anatómica: Recto",
            "Diagnóstico: adenocarcinoma",
            "no se detecta pérdida",
        ],
    ));

    let output = extract_from_lines(&lines, &HarvestConfig::default());
    let ids: Vec<&str> = output.records.iter().map(|r| r.identifier()).collect();
    let pages: Vec<u32> = output.records.iter().map(|r| r.page()).collect();
    assert_eq!(ids, ["124168", "765432", "222222"]);
    assert_eq!(pages, [1, 2, 4]);
    assert_eq!(output.stats.blocks, 4);
    assert_eq!(output.stats.rejected, 1);
}

#[test]
fn extraction_is_idempotent() {
    let mut lines = scenario_a();
    lines.extend(scenario_a().into_iter().map(|l| RawLine::new(5, l.text)));
    let first = records(&lines);
    let second = records(&lines);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

// ── Field capture ────────────────────────────────────────────────────────────

#[test]
fn greedy_capture_runs_to_block_end() {
    let out = records(&scenario_a());
    assert!(out[0].sample_id().contains("NHC: 124168"));
    assert!(out[0].sample_id().ends_with("pérdida de expresión"));
}

#[test]
fn bounded_capture_stops_at_next_label() {
    let config = HarvestConfig::builder()
        .field_capture(FieldCapture::NextLabel)
        .build()
        .unwrap();
    let out = extract_from_lines(&scenario_a(), &config).records;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].sample_id(), "22B-14462");
    assert_eq!(out[0].origin(), "intestino grueso.");
    assert_eq!(out[0].identifier(), "124168");
}
