//! PDF text extraction: read every page's text layer via pdfium and turn it
//! into the ordered `(page, line)` stream the segmenter consumes.
//!
//! Only the embedded text layer is read. Image-only pages yield no lines and
//! are logged; there is no OCR fallback.

use crate::error::HarvestError;
use crate::output::RawLine;
use crate::pipeline::normalize::clean_line;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming a pdfium library file or the directory holding it.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Text of a whole document, one entry per physical line in reading order.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub page_count: usize,
    pub lines: Vec<RawLine>,
}

/// Read every page of the PDF at `pdf_path`.
pub fn read_lines(pdf_path: &Path, password: Option<&str>) -> Result<DocumentText, HarvestError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_load_error(pdf_path, password, e))?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    let mut lines = Vec::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx as u32 + 1;
        let text = page
            .text()
            .map_err(|e| HarvestError::TextExtractionFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?
            .all();

        if text.trim().is_empty() {
            warn!("Page {} has no text layer", page_num);
        }

        let before = lines.len();
        lines.extend(split_page_text(page_num, &text));
        debug!("Page {} → {} lines", page_num, lines.len() - before);
    }

    Ok(DocumentText { page_count, lines })
}

/// Split one page's text into cleaned lines, keeping blank lines.
pub fn split_page_text(page: u32, text: &str) -> impl Iterator<Item = RawLine> + '_ {
    text.split('\n')
        .map(move |line| RawLine::new(page, clean_line(line)))
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` first, then the system library.
fn bind_pdfium() -> Result<Pdfium, HarvestError> {
    if let Ok(configured) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        let configured_path = Path::new(&configured);
        let lib_path = if configured_path.is_dir() {
            let file_name = format!(
                "{}pdfium{}",
                std::env::consts::DLL_PREFIX,
                std::env::consts::DLL_SUFFIX
            );
            configured_path.join(file_name).to_string_lossy().to_string()
        } else {
            configured.clone()
        };
        debug!(path = %lib_path, "Loading pdfium from {}", PDFIUM_LIB_PATH_ENV);
        let bindings = Pdfium::bind_to_library(&lib_path).map_err(|e| {
            HarvestError::PdfiumBindingFailed(format!("{lib_path}: {e:?}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| HarvestError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn map_load_error(pdf_path: &Path, password: Option<&str>, e: PdfiumError) -> HarvestError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            HarvestError::WrongPassword {
                path: pdf_path.to_path_buf(),
            }
        } else {
            HarvestError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        }
    } else {
        HarvestError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: err_str,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_order_page_and_blank_lines() {
        let lines: Vec<RawLine> =
            split_page_text(3, "Nº de muestra/biopsia: 1\r\n\r\nNHC: 123456").collect();
        assert_eq!(
            lines,
            vec![
                RawLine::new(3, "Nº de muestra/biopsia: 1"),
                RawLine::new(3, ""),
                RawLine::new(3, "NHC: 123456"),
            ]
        );
    }

    #[test]
    fn marker_broken_by_invisible_characters_still_opens_a_block() {
        let text = "cabecera\nNº de mues\u{00AD}tra/biop\u{200B}sia: 22B-1\nNHC: 124168";
        let lines: Vec<RawLine> = split_page_text(2, text).collect();
        let blocks = crate::pipeline::segment::segment(&lines);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].page(), 2);
        assert!(blocks[0].flatten().starts_with("Nº de muestra/biopsia: 22B-1"));
    }

    #[test]
    fn split_empty_page_yields_one_blank_line() {
        let lines: Vec<RawLine> = split_page_text(1, "").collect();
        assert_eq!(lines, vec![RawLine::new(1, "")]);
    }
}
