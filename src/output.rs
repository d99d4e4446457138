//! Data carried through the pipeline and returned to the caller.

use serde::Serialize;
use std::path::PathBuf;

/// One PDF page: its extracted text, its translation, and its images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    /// 1-indexed page number in document order.
    pub page_num: usize,
    /// Plain text extracted from the page; empty when the page has none.
    pub source_text: String,
    /// Set exactly once, when the page has been translated.
    pub translated_text: Option<String>,
    /// PNG-encoded images in the order the page declares them.
    #[serde(skip)]
    pub images: Vec<Vec<u8>>,
}

impl PageRecord {
    pub fn new(page_num: usize, source_text: impl Into<String>) -> Self {
        Self {
            page_num,
            source_text: source_text.into(),
            translated_text: None,
            images: Vec::new(),
        }
    }

    /// Append one encoded image.
    pub fn with_image(mut self, png: Vec<u8>) -> Self {
        self.images.push(png);
        self
    }

    pub fn is_translated(&self) -> bool {
        self.translated_text.is_some()
    }
}

/// Timing and size counters for a finished run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    pub total_images: usize,
    /// Pages whose extracted text was blank.
    pub empty_pages: usize,
    pub source_chars: usize,
    pub translated_chars: usize,
    pub extract_duration_ms: u64,
    pub translate_duration_ms: u64,
    pub narrate_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a successful conversion produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// Absolute path of the muxed MP4.
    pub video_path: PathBuf,
    /// Narration WAV.
    pub audio_path: PathBuf,
    /// Directory holding the numbered frames.
    pub frames_dir: PathBuf,
    /// Frame files in playback order.
    pub frame_paths: Vec<PathBuf>,
    /// Page records, translated.
    pub pages: Vec<PageRecord>,
    pub stats: ConversionStats,
}
