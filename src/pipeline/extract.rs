//! Document extraction: per-page text and embedded images via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking pool so the
//! runtime's worker thread is not stalled while pages are decoded.
//!
//! ## Which images?
//!
//! Only page-level image objects are collected, in the order pdfium lists
//! them on the page. Each is decoded to a bitmap and re-encoded as PNG, so
//! the rest of the pipeline never sees the PDF's original image filters.

use crate::error::Pdf2VideoError;
use crate::output::PageRecord;
use crate::pipeline::encode::encode_png;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Anything that can turn a PDF path into ordered page records.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Extract every page, in document order.
    async fn extract(&self, pdf_path: &Path) -> Result<Vec<PageRecord>, Pdf2VideoError>;
}

/// The default extractor, backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    password: Option<String>,
}

impl PdfiumExtractor {
    pub fn new(password: Option<String>) -> Self {
        Self { password }
    }
}

#[async_trait]
impl PageSource for PdfiumExtractor {
    async fn extract(&self, pdf_path: &Path) -> Result<Vec<PageRecord>, Pdf2VideoError> {
        let path = pdf_path.to_path_buf();
        let password = self.password.clone();

        tokio::task::spawn_blocking(move || extract_pages_blocking(&path, password.as_deref()))
            .await
            .map_err(|e| Pdf2VideoError::Internal(format!("Extraction task panicked: {}", e)))?
    }
}

/// Platform file name of the pdfium shared library.
fn pdfium_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else if cfg!(target_os = "macos") {
        "libpdfium.dylib"
    } else {
        "libpdfium.so"
    }
}

/// Directories searched for a local pdfium copy before the system library.
fn local_library_candidates() -> Vec<PathBuf> {
    let name = pdfium_library_name();
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(name));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(name));
    }
    candidates
}

/// Bind to pdfium: `PDFIUM_LIB_PATH`, then a local copy, then the system library.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2VideoError> {
    if let Ok(p) = std::env::var("PDFIUM_LIB_PATH") {
        if !p.is_empty() {
            return Pdfium::bind_to_library(&p)
                .map(Pdfium::new)
                .map_err(|e| Pdf2VideoError::PdfiumBindingFailed(format!("{p}: {e:?}")));
        }
    }

    for candidate in local_library_candidates() {
        if candidate.exists() {
            if let Ok(bindings) = Pdfium::bind_to_library(&candidate) {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| Pdf2VideoError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Map a pdfium load error to the matching document error.
fn load_error(pdf_path: &Path, password: Option<&str>, e: PdfiumError) -> Pdf2VideoError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            Pdf2VideoError::WrongPassword {
                path: pdf_path.to_path_buf(),
            }
        } else {
            Pdf2VideoError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        }
    } else {
        Pdf2VideoError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Blocking implementation of page extraction.
fn extract_pages_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<Vec<PageRecord>, Pdf2VideoError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| load_error(pdf_path, password, e))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut records = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        let text = page
            .text()
            .map(|t| t.all())
            .map_err(|e| Pdf2VideoError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("text of page {page_num}: {e:?}"),
            })?;

        let mut record = PageRecord::new(page_num, text);

        for object in page.objects().iter() {
            let Some(image_object) = object.as_image_object() else {
                continue;
            };
            let image_num = record.images.len() + 1;

            let bitmap = image_object.get_raw_image().map_err(|e| {
                Pdf2VideoError::ImageExtractionFailed {
                    page: page_num,
                    image: image_num,
                    detail: format!("{e:?}"),
                }
            })?;

            let png = encode_png(&bitmap).map_err(|e| Pdf2VideoError::ImageExtractionFailed {
                page: page_num,
                image: image_num,
                detail: format!("PNG encoding failed: {e}"),
            })?;

            record.images.push(png);
        }

        debug!(
            "Page {}: {} chars, {} images",
            page_num,
            record.source_text.chars().count(),
            record.images.len()
        );
        records.push(record);
    }

    Ok(records)
}
