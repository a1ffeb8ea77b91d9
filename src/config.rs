//! Configuration types for a harvest run.
//!
//! All run behaviour is controlled through [`HarvestConfig`], built via its
//! [`HarvestConfigBuilder`]. Output locations are not part of the config;
//! they are passed to the entry points in [`crate::harvest`].

use crate::error::HarvestError;
use crate::observer::{ExtractionObserver, SharedObserver};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for extracting and joining pathology reports.
///
/// # Example
/// ```rust
/// use pathology_harvest::{ColumnProjection, FieldCapture, HarvestConfig};
///
/// let config = HarvestConfig::builder()
///     .field_capture(FieldCapture::NextLabel)
///     .projection(ColumnProjection::ByName)
///     .biobank_sheet("Hoja1")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct HarvestConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// How far free-text fields extend in the flattened block. Default: [`FieldCapture::ToEnd`].
    pub field_capture: FieldCapture,

    /// How the biobank columns are selected. Default: [`ColumnProjection::ByPosition`].
    pub projection: ColumnProjection,

    /// Worksheet to read from a biobank workbook. If None, the first sheet.
    pub biobank_sheet: Option<String>,

    /// Receives per-block diagnostic events. If None, events are only logged.
    pub observer: Option<SharedObserver>,
}

impl fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("field_capture", &self.field_capture)
            .field("projection", &self.projection)
            .field("biobank_sheet", &self.biobank_sheet)
            .field(
                "observer",
                &self.observer.as_ref().map(|_| "<dyn ExtractionObserver>"),
            )
            .finish()
    }
}

impl HarvestConfig {
    /// Create a new builder for `HarvestConfig`.
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`HarvestConfig`].
#[derive(Debug)]
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn field_capture(mut self, capture: FieldCapture) -> Self {
        self.config.field_capture = capture;
        self
    }

    pub fn projection(mut self, projection: ColumnProjection) -> Self {
        self.config.projection = projection;
        self
    }

    pub fn biobank_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.config.biobank_sheet = Some(sheet.into());
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<HarvestConfig, HarvestError> {
        if let Some(sheet) = &self.config.biobank_sheet {
            if sheet.trim().is_empty() {
                return Err(HarvestError::InvalidConfig(
                    "biobank sheet name must not be blank".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Extent of the sample, origin and diagnosis captures.
///
/// Blocks are flattened to one line before matching, so a capture that runs
/// "to the end of the line" runs to the end of the block and swallows every
/// later field. `ToEnd` keeps that behaviour; `NextLabel` cuts each capture
/// at the next known report label instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldCapture {
    /// Capture to the end of the flattened block. (default)
    #[default]
    ToEnd,
    /// Stop at the next `NHC`, `- Procedencia anatómica`, `Diagnóstico` or sample label.
    NextLabel,
}

/// How the nine biobank columns are picked out of the external dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnProjection {
    /// Take the first nine columns and rename them. (default)
    #[default]
    ByPosition,
    /// Select columns whose headers already carry the nine semantic names.
    ByName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;

    #[test]
    fn defaults_preserve_greedy_capture_and_positional_projection() {
        let c = HarvestConfig::default();
        assert_eq!(c.field_capture, FieldCapture::ToEnd);
        assert_eq!(c.projection, ColumnProjection::ByPosition);
        assert!(c.password.is_none());
        assert!(c.observer.is_none());
    }

    #[test]
    fn blank_sheet_is_rejected() {
        let err = HarvestConfig::builder().biobank_sheet("  ").build().unwrap_err();
        assert!(matches!(err, HarvestError::InvalidConfig(_)));
    }

    #[test]
    fn builder_sets_every_field() {
        let c = HarvestConfig::builder()
            .password("secret")
            .field_capture(FieldCapture::NextLabel)
            .projection(ColumnProjection::ByName)
            .biobank_sheet("Muestras")
            .observer(Arc::new(NoopObserver))
            .build()
            .unwrap();
        assert_eq!(c.password.as_deref(), Some("secret"));
        assert_eq!(c.field_capture, FieldCapture::NextLabel);
        assert_eq!(c.projection, ColumnProjection::ByName);
        assert_eq!(c.biobank_sheet.as_deref(), Some("Muestras"));
        assert!(c.observer.is_some());
    }

    #[test]
    fn debug_redacts_password() {
        let c = HarvestConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
