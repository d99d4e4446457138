//! Progress-callback trait for pipeline events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its stages and translates each page.
//! The CLI uses it to drive a terminal progress bar.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2video::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     translated: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, translated_len: usize) {
//!         self.translated.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} translated ({} bytes)", page_num, total_pages, translated_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     translated: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Pipeline stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    Translating,
    Narrating,
    WritingFrames,
    Assembling,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Extracting => "Extracting",
            Stage::Translating => "Translating",
            Stage::Narrating => "Narrating",
            Stage::WritingFrames => "Writing frames",
            Stage::Assembling => "Assembling",
        };
        f.write_str(s)
    }
}

/// Called by the conversion pipeline as it runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is sequential, so calls never overlap,
/// but the trait is `Send + Sync` so implementations can be shared freely.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after extraction, before the first page is translated.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when the pipeline enters a new stage.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called just before a page's translation request is sent.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been translated.
    ///
    /// `translated_len` is the byte length of the translated text.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, translated_len: usize) {
        let _ = (page_num, total_pages, translated_len);
    }

    /// Called when a page's translation fails. The run aborts right after.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once the video has been written.
    fn on_conversion_complete(&self, video_path: &Path) {
        let _ = video_path;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
