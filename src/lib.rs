//! # edgequake-pdf2video
//!
//! Turn a PDF into a narrated video: the text of every page is translated
//! through a chat-completion API, read aloud by a speech engine, and laid over
//! the document's embedded images shown one per second.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      check the file exists and starts with %PDF
//!  ├─ 2. Extract    page text + embedded images via pdfium (spawn_blocking)
//!  ├─ 3. Translate  one chat-completion request per page, in order
//!  ├─ 4. Narrate    all translations joined by "\n" → output.wav
//!  ├─ 5. Frames     images → frames/frame001.png, frame002.png, …
//!  ├─ 6. Assemble   ffmpeg, 1 fps + narration → video.mp4
//!  └─ 7. Launch     caller reports the path, then opens it (best effort)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2video::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from OPENAI_API_KEY
//!     let config = ConversionConfig::default();
//!     let output = convert("slides.pdf", &config).await?;
//!     println!("Video created at {}", output.video_path.display());
//!     if config.open_video {
//!         edgequake_pdf2video::launch::open_with_default_app(&output.video_path);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## External programs
//!
//! | Stage | Needs |
//! |-------|-------|
//! | Extract | the pdfium shared library (`PDFIUM_LIB_PATH`, next to the binary, or system-wide) |
//! | Narrate | `espeak-ng`/`espeak` (Linux), `say` (macOS), PowerShell `System.Speech` (Windows) |
//! | Assemble | `ffmpeg` on `PATH` |
//!
//! Every external collaborator sits behind a trait ([`PageSource`],
//! [`PageTranslator`], [`ChatTransport`], [`SpeechEngine`], [`Transcoder`])
//! and can be replaced through [`ConversionConfigBuilder`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2video` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod launch;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync};
pub use error::{ErrorKind, Pdf2VideoError};
pub use output::{ConversionOutput, ConversionStats, PageRecord};
pub use pipeline::assemble::{AssemblyJob, FfmpegTranscoder, Transcoder};
pub use pipeline::extract::{PageSource, PdfiumExtractor};
pub use pipeline::narrate::{CommandSpeechEngine, SpeechEngine};
pub use pipeline::translate::{
    ChatCompletionRequest, ChatTransport, ChatTranslator, PageTranslator, ReqwestTransport,
    TransportResponse,
};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
