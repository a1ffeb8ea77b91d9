//! Observer trait for per-block extraction events.
//!
//! Inject an [`Arc<dyn ExtractionObserver>`] via
//! [`crate::config::HarvestConfigBuilder::observer`] to receive the diagnostic
//! trace of every parsed block, every rejection and every accepted record.
//! Events are advisory: nothing an observer does can change which blocks are
//! accepted.
//!
//! # Example
//!
//! ```rust
//! use pathology_harvest::{ExtractionObserver, HarvestConfig, Rejection};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct RejectionCounter(AtomicUsize);
//!
//! impl ExtractionObserver for RejectionCounter {
//!     fn on_block_rejected(&self, page: u32, rejection: &Rejection) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page}: {rejection}");
//!     }
//! }
//!
//! let config = HarvestConfig::builder()
//!     .observer(Arc::new(RejectionCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::Rejection;
use crate::output::{FieldTrace, ReportRecord};
use std::sync::Arc;

/// Called by the pipeline as it segments and parses a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExtractionObserver: Send + Sync {
    /// Called once the line stream has been split into candidate blocks.
    fn on_segmentation_complete(&self, total_lines: usize, blocks: usize) {
        let _ = (total_lines, blocks);
    }

    /// Called with the extracted values of a block whose origin (if any)
    /// passed validation, before the final acceptance check.
    fn on_fields_extracted(&self, trace: &FieldTrace) {
        let _ = trace;
    }

    /// Called when a block is rejected.
    ///
    /// # Arguments
    /// * `page`: page of the block's marker line
    /// * `rejection`: the first rule the block failed
    fn on_block_rejected(&self, page: u32, rejection: &Rejection) {
        let _ = (page, rejection);
    }

    /// Called when a block becomes a record.
    fn on_record_accepted(&self, record: &ReportRecord) {
        let _ = record;
    }

    /// Called once after every block has been parsed.
    fn on_extraction_complete(&self, blocks: usize, accepted: usize) {
        let _ = (blocks, accepted);
    }
}

/// An observer that ignores every event. Used when none is configured.
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::HarvestConfig`].
pub type SharedObserver = Arc<dyn ExtractionObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracking {
        rejected: AtomicUsize,
        accepted: AtomicUsize,
    }

    impl ExtractionObserver for Tracking {
        fn on_block_rejected(&self, _page: u32, _rejection: &Rejection) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
        }

        fn on_record_accepted(&self, _record: &ReportRecord) {
            self.accepted.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.on_segmentation_complete(10, 2);
        obs.on_block_rejected(1, &Rejection::MissingIdentifier);
        obs.on_extraction_complete(2, 0);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let obs = Tracking {
            rejected: AtomicUsize::new(0),
            accepted: AtomicUsize::new(0),
        };
        obs.on_block_rejected(3, &Rejection::OutcomeNotFound);
        obs.on_block_rejected(4, &Rejection::MissingOrigin);
        assert_eq!(obs.rejected.load(Ordering::SeqCst), 2);
        assert_eq!(obs.accepted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shared_observer_is_object_safe() {
        let obs: SharedObserver = Arc::new(NoopObserver);
        obs.on_segmentation_complete(0, 0);
    }
}
