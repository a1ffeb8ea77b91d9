//! Pattern-based single-field extraction.
//!
//! Every pattern is matched against a whole block flattened to one line, so
//! none of them anchor to `^`/`$`. All patterns are case-insensitive and have
//! exactly one capturing group.

use crate::config::FieldCapture;
use once_cell::sync::Lazy;
use regex::Regex;

/// Patient number: `NHC` (spaces allowed between letters), optional `:`/`-`, six digits.
pub static RE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)n\s*h\s*c\s*[:\-]?\s*(\d{6})").unwrap());

/// Sample label value. Runs to the end of the flattened block.
pub static RE_SAMPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)nº\s*de\s*muestra\s*/?\s*biopsia\s*[:\-]?\s*(.+)").unwrap());

pub static RE_ORIGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)-\s*procedencia\s*anat[óo]mica\s*[:\-]?\s*([^\n]+)").unwrap()
});

pub static RE_DIAGNOSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)diagn[óo]stico\s*[:\-]?\s*([^\n]+)").unwrap());

/// Block boundary: the sample label on its own, tested per raw line.
pub static RE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)nº\s*de\s*muestra\s*/?\s*biopsia").unwrap());

/// Any label that starts another field. Used by [`FieldCapture::NextLabel`].
static RE_NEXT_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bn\s*h\s*c\b|-\s*procedencia\s*anat[óo]mica|diagn[óo]stico|nº\s*de\s*muestra\s*/?\s*biopsia",
    )
    .unwrap()
});

/// First capture group of the first match of `pattern`, trimmed.
///
/// Returns `None` when the pattern does not match and when the capture is
/// blank; callers cannot tell the two apart.
pub fn extract_first_group(text: &str, pattern: &Regex) -> Option<String> {
    let caps = pattern.captures(text)?;
    let value = caps.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Like [`extract_first_group`] but honouring the capture policy for
/// free-text fields.
pub fn extract_field(text: &str, pattern: &Regex, capture: FieldCapture) -> Option<String> {
    match capture {
        FieldCapture::ToEnd => extract_first_group(text, pattern),
        FieldCapture::NextLabel => {
            let caps = pattern.captures(text)?;
            let group = caps.get(1)?.as_str();
            let bounded = match RE_NEXT_LABEL.find(group) {
                Some(m) => &group[..m.start()],
                None => group,
            };
            let value = bounded.trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
    }
}

/// True iff `line` opens a new report block.
pub fn is_marker_line(line: &str) -> bool {
    RE_MARKER.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = "Nº de muestra/biopsia: 22B-14462 NHC: 124168 \
- Procedencia anatómica: intestino grueso. Diagnóstico: adenocarcinoma. \
NO SE DETECTA pérdida de expresión";

    #[test]
    fn identifier_requires_six_digits() {
        assert_eq!(
            extract_first_group("NHC: 124168", &RE_IDENTIFIER).as_deref(),
            Some("124168")
        );
        assert_eq!(
            extract_first_group("n h c -  654321", &RE_IDENTIFIER).as_deref(),
            Some("654321")
        );
        assert_eq!(extract_first_group("NHC: 12345", &RE_IDENTIFIER), None);
        assert_eq!(extract_first_group("no identifier here", &RE_IDENTIFIER), None);
    }

    #[test]
    fn identifier_takes_first_six_of_longer_run() {
        assert_eq!(
            extract_first_group("NHC 1241689", &RE_IDENTIFIER).as_deref(),
            Some("124168")
        );
    }

    #[test]
    fn sample_capture_is_greedy_to_end() {
        let sample = extract_first_group(FLAT, &RE_SAMPLE).unwrap();
        assert!(sample.starts_with("22B-14462 NHC: 124168"));
        assert!(sample.ends_with("de expresión"));
    }

    #[test]
    fn sample_label_tolerates_missing_slash() {
        assert_eq!(
            extract_first_group("nº de muestra biopsia - 21B-0001", &RE_SAMPLE).as_deref(),
            Some("21B-0001")
        );
    }

    #[test]
    fn blank_capture_is_absent() {
        assert_eq!(extract_first_group("Diagnóstico:    ", &RE_DIAGNOSIS), None);
        assert_eq!(extract_first_group("Nº de muestra/biopsia:   ", &RE_SAMPLE), None);
    }

    #[test]
    fn origin_and_diagnosis_accept_unaccented_labels() {
        assert_eq!(
            extract_first_group("- Procedencia anatomica: recto", &RE_ORIGIN).as_deref(),
            Some("recto")
        );
        assert_eq!(
            extract_first_group("DIAGNOSTICO - adenoma", &RE_DIAGNOSIS).as_deref(),
            Some("adenoma")
        );
    }

    #[test]
    fn origin_requires_leading_dash() {
        assert_eq!(extract_first_group("Procedencia anatómica: colon", &RE_ORIGIN), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let text = "Diagnóstico: primero Diagnóstico: segundo";
        let diag = extract_first_group(text, &RE_DIAGNOSIS).unwrap();
        assert!(diag.starts_with("primero"));
    }

    #[test]
    fn next_label_bounds_free_text_fields() {
        let cap = FieldCapture::NextLabel;
        assert_eq!(extract_field(FLAT, &RE_SAMPLE, cap).as_deref(), Some("22B-14462"));
        assert_eq!(
            extract_field(FLAT, &RE_ORIGIN, cap).as_deref(),
            Some("intestino grueso.")
        );
        assert_eq!(
            extract_field(FLAT, &RE_DIAGNOSIS, cap).as_deref(),
            Some("adenocarcinoma. NO SE DETECTA pérdida de expresión")
        );
    }

    #[test]
    fn next_label_with_label_immediately_after_is_absent() {
        let text = "Nº de muestra/biopsia: NHC: 124168";
        assert_eq!(extract_field(text, &RE_SAMPLE, FieldCapture::NextLabel), None);
        assert!(extract_field(text, &RE_SAMPLE, FieldCapture::ToEnd).is_some());
    }

    #[test]
    fn marker_detection() {
        assert!(is_marker_line("Nº de muestra/biopsia: 22B-14462"));
        assert!(is_marker_line("  nº  DE MUESTRA / BIOPSIA"));
        assert!(!is_marker_line("Número de muestra: 22B-14462"));
        assert!(!is_marker_line("NHC: 124168"));
    }
}
