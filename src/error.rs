//! Error types for the edgequake-pdf2video library.
//!
//! Every failure in the pipeline is fatal: a run either produces a video or
//! stops at the first broken step. [`Pdf2VideoError`] carries enough detail
//! to print a useful diagnostic, and [`Pdf2VideoError::kind`] groups the
//! variants by the pipeline stage that raised them so callers (and tests)
//! can match on the category without caring about the exact variant.
//!
//! Launching the finished video is best-effort and never produces an error.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Pdf2VideoError> = std::result::Result<T, E>;

/// Coarse error category, one per pipeline stage that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source PDF is missing, unreadable, or not a valid PDF.
    DocumentOpen,
    /// The translation API credential is not set.
    MissingCredential,
    /// The translation endpoint failed or answered with an unexpected shape.
    TranslationService,
    /// The speech engine could not produce the narration track.
    SpeechSynthesis,
    /// The external transcoder is missing or exited non-zero.
    Transcode,
    /// Anything else (frame I/O, configuration, internal invariants).
    Other,
}

/// All fatal errors returned by the edgequake-pdf2video library.
#[derive(Debug, Error)]
pub enum Pdf2VideoError {
    // ── Document errors ───────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not decode or re-encode an embedded image.
    #[error("Image {image} on page {page} could not be extracted: {detail}")]
    ImageExtractionFailed {
        page: usize,
        image: usize,
        detail: String,
    },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium for your platform, or point PDFIUM_LIB_PATH at an existing\n\
libpdfium (pre-built copies: https://github.com/bblanchon/pdfium-binaries).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Translation errors ────────────────────────────────────────────────
    /// The API credential variable is absent or empty.
    #[error("Translation credential is not set.\nExport {var}=<your API key> and try again.")]
    MissingCredential { var: String },

    /// Non-2xx status, transport failure, or an unexpected response body.
    #[error("Translation service error{}: {detail}", .page.map(|p| format!(" on page {p}")).unwrap_or_default())]
    TranslationService {
        page: Option<usize>,
        status: Option<u16>,
        detail: String,
    },

    // ── Narration errors ──────────────────────────────────────────────────
    /// The speech engine is missing, failed, or wrote no audio.
    #[error("Speech synthesis failed ({engine}): {detail}")]
    SpeechSynthesis { engine: String, detail: String },

    // ── Transcoding errors ────────────────────────────────────────────────
    /// The transcoder binary is not on the system path.
    #[error("Transcoder '{program}' not found on PATH. Please install it.")]
    TranscoderNotFound { program: String },

    /// The transcoder exited unsuccessfully.
    #[error("Transcoder '{program}' exited with {}:\n{stderr}", .code.map(|c| format!("code {c}")).unwrap_or_else(|| "a signal".into()))]
    TranscodeFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// No frames were extracted, so there is no video stream to encode.
    #[error("No frames to encode in '{frames_dir}': the PDF contains no embedded images")]
    NoFrames { frames_dir: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the frame directory or write a frame file.
    #[error("Failed to write frame '{path}': {source}")]
    FrameWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2VideoError {
    /// The pipeline stage category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::NotAPdf { .. }
            | Self::CorruptPdf { .. }
            | Self::PasswordRequired { .. }
            | Self::WrongPassword { .. }
            | Self::ImageExtractionFailed { .. }
            | Self::PdfiumBindingFailed(_) => ErrorKind::DocumentOpen,
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::TranslationService { .. } => ErrorKind::TranslationService,
            Self::SpeechSynthesis { .. } => ErrorKind::SpeechSynthesis,
            Self::TranscoderNotFound { .. }
            | Self::TranscodeFailed { .. }
            | Self::NoFrames { .. } => ErrorKind::Transcode,
            Self::FrameWriteFailed { .. } | Self::InvalidConfig(_) | Self::Internal(_) => {
                ErrorKind::Other
            }
        }
    }

    pub(crate) fn translation(detail: impl Into<String>) -> Self {
        Self::TranslationService {
            page: None,
            status: None,
            detail: detail.into(),
        }
    }

    /// Attach a page number to a translation error that doesn't carry one yet.
    pub(crate) fn on_page(self, page_num: usize) -> Self {
        match self {
            Self::TranslationService {
                page: None,
                status,
                detail,
            } => Self::TranslationService {
                page: Some(page_num),
                status,
                detail,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_errors_share_a_kind() {
        let errors = [
            Pdf2VideoError::FileNotFound { path: "a.pdf".into() },
            Pdf2VideoError::NotAPdf {
                path: "a.pdf".into(),
                magic: *b"GIF8",
            },
            Pdf2VideoError::CorruptPdf {
                path: "a.pdf".into(),
                detail: "xref".into(),
            },
            Pdf2VideoError::PdfiumBindingFailed("no lib".into()),
        ];
        for e in errors {
            assert_eq!(e.kind(), ErrorKind::DocumentOpen, "{e}");
        }
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let e = Pdf2VideoError::MissingCredential {
            var: "OPENAI_API_KEY".into(),
        };
        assert_eq!(e.kind(), ErrorKind::MissingCredential);
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn translation_error_display_with_page() {
        let e = Pdf2VideoError::translation("HTTP 500").on_page(3);
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("HTTP 500"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::TranslationService);
    }

    #[test]
    fn on_page_keeps_existing_page() {
        let e = Pdf2VideoError::TranslationService {
            page: Some(1),
            status: None,
            detail: "x".into(),
        }
        .on_page(7);
        assert!(matches!(e, Pdf2VideoError::TranslationService { page: Some(1), .. }));
    }

    #[test]
    fn transcode_failed_surfaces_stderr() {
        let e = Pdf2VideoError::TranscodeFailed {
            program: "ffmpeg".into(),
            code: Some(1),
            stderr: "Unknown encoder 'libx264'".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("code 1"));
        assert!(msg.contains("libx264"));
        assert_eq!(e.kind(), ErrorKind::Transcode);
    }

    #[test]
    fn signal_exit_display() {
        let e = Pdf2VideoError::TranscodeFailed {
            program: "ffmpeg".into(),
            code: None,
            stderr: String::new(),
        };
        assert!(e.to_string().contains("a signal"));
    }
}
