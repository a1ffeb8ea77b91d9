//! Report parsing: turn one candidate block into a record or a rejection.
//!
//! The rules, in the order they are applied to the flattened block:
//!
//! 1. pull the NHC, sample label, anatomical origin and diagnosis;
//! 2. if an origin was found, it must start with an allowed site, otherwise
//!    the whole report is rejected on the spot;
//! 3. look for the outcome phrase anywhere in the block;
//! 4. emit the diagnostic trace;
//! 5. accept only if every field is present and the phrase was found.

use crate::config::{FieldCapture, HarvestConfig};
use crate::error::Rejection;
use crate::observer::{NoopObserver, SharedObserver};
use crate::output::{FieldTrace, ReportRecord};
use crate::pipeline::fields::{
    extract_field, extract_first_group, RE_DIAGNOSIS, RE_IDENTIFIER, RE_ORIGIN, RE_SAMPLE,
};
use crate::pipeline::normalize::{contains_phrase, starts_with_any};
use crate::pipeline::segment::CandidateBlock;
use std::sync::Arc;
use tracing::debug;

/// Phrase that marks a qualifying result. Stored verbatim in accepted records.
pub const OUTCOME_PHRASE: &str = "NO SE DETECTA pérdida";

/// Accepted anatomical origins, already normalised.
pub const ALLOWED_ORIGINS: [&str; 4] = ["colon", "sigma", "recto", "intestino grueso"];

/// Stateless parser for candidate blocks.
///
/// Holds only the capture policy and the observer, so one parser can be
/// reused for every block of a document without blocks influencing each
/// other.
#[derive(Clone)]
pub struct ReportParser {
    capture: FieldCapture,
    observer: SharedObserver,
}

impl ReportParser {
    pub fn new(capture: FieldCapture) -> Self {
        Self {
            capture,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        let parser = Self::new(config.field_capture);
        match &config.observer {
            Some(observer) => parser.with_observer(Arc::clone(observer)),
            None => parser,
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Parse `block`, returning the record or `None`.
    ///
    /// Rejections are reported to the observer and logged; they never
    /// propagate.
    pub fn parse(&self, block: &CandidateBlock<'_>) -> Option<ReportRecord> {
        match self.evaluate(block) {
            Ok(record) => {
                debug!(page = record.page(), nhc = record.identifier(), "Report accepted");
                self.observer.on_record_accepted(&record);
                Some(record)
            }
            Err(rejection) => {
                debug!(page = block.page(), %rejection, "Report rejected");
                self.observer.on_block_rejected(block.page(), &rejection);
                None
            }
        }
    }

    /// Parse `block`, naming the first rule it fails.
    pub fn evaluate(&self, block: &CandidateBlock<'_>) -> Result<ReportRecord, Rejection> {
        self.evaluate_text(&block.flatten(), block.page())
    }

    /// Parse an already flattened block that opened on `page`.
    pub fn evaluate_text(&self, text: &str, page: u32) -> Result<ReportRecord, Rejection> {
        let identifier = extract_first_group(text, &RE_IDENTIFIER);
        let sample_id = extract_field(text, &RE_SAMPLE, self.capture);
        let origin_raw = extract_field(text, &RE_ORIGIN, self.capture);
        let diagnosis = extract_field(text, &RE_DIAGNOSIS, self.capture);
        let outcome_found = contains_phrase(text, OUTCOME_PHRASE);

        // Present-but-invalid origin rejects the report before anything else.
        let origin = match origin_raw {
            Some(origin) if starts_with_any(&origin, &ALLOWED_ORIGINS) => Some(origin),
            Some(origin) => return Err(Rejection::InvalidOrigin { origin }),
            None => None,
        };

        let trace = FieldTrace {
            page,
            identifier,
            sample_id,
            origin,
            diagnosis,
            outcome_found,
        };
        debug!(
            page,
            nhc = ?trace.identifier,
            sample = ?trace.sample_id,
            origin = ?trace.origin,
            diagnosis = ?trace.diagnosis,
            outcome = trace.outcome_found,
            "Extracted report fields"
        );
        self.observer.on_fields_extracted(&trace);

        let FieldTrace {
            identifier,
            sample_id,
            origin,
            diagnosis,
            outcome_found,
            ..
        } = trace;

        let identifier = identifier.ok_or(Rejection::MissingIdentifier)?;
        let sample_id = sample_id.ok_or(Rejection::MissingSampleId)?;
        let origin = origin.ok_or(Rejection::MissingOrigin)?;
        let diagnosis = diagnosis.ok_or(Rejection::MissingDiagnosis)?;
        if !outcome_found {
            return Err(Rejection::OutcomeNotFound);
        }

        Ok(ReportRecord::new(
            identifier,
            sample_id,
            origin,
            diagnosis,
            OUTCOME_PHRASE.to_string(),
            page,
        ))
    }
}
