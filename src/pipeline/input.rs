//! Input validation: check the user-supplied PDF path before pdfium sees it.
//!
//! pdfium reports a missing or non-PDF file as a generic load failure, so we
//! check existence, read permission and the `%PDF` magic bytes first and
//! return a specific error for each.

use crate::error::HarvestError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` names a readable PDF file.
pub fn resolve_pdf(path: impl AsRef<Path>) -> Result<PathBuf, HarvestError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(HarvestError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(HarvestError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(HarvestError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(HarvestError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Validate that `path` names an existing, readable file of any kind.
pub fn resolve_existing(path: impl AsRef<Path>) -> Result<PathBuf, HarvestError> {
    let path = path.as_ref().to_path_buf();
    if !path.is_file() {
        return Err(HarvestError::FileNotFound { path });
    }
    match std::fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(HarvestError::PermissionDenied { path })
        }
        Err(_) => Err(HarvestError::FileNotFound { path }),
    }
}
