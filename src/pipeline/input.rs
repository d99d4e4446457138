//! Input validation: make sure the user-supplied path is a readable PDF.
//!
//! pdfium reports a missing file and a corrupt file with the same opaque
//! error, so the cheap checks happen here first: existence, read permission,
//! and the `%PDF` magic bytes.

use crate::error::Pdf2VideoError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local file path, returning it unchanged on success.
pub fn resolve_local(path: &Path) -> Result<PathBuf, Pdf2VideoError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(Pdf2VideoError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic != b"%PDF" => {
                    return Err(Pdf2VideoError::NotAPdf { path, magic });
                }
                Ok(()) => {}
                Err(_) => {
                    // Shorter than four bytes: cannot be a PDF.
                    return Err(Pdf2VideoError::CorruptPdf {
                        path,
                        detail: "file is truncated".into(),
                    });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2VideoError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2VideoError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
