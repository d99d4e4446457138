//! Conversion entry points.
//!
//! The pipeline is strictly linear: every stage finishes before the next one
//! starts and the first error aborts the run. Files already written (audio,
//! frames) are left where they are.

use crate::config::ConversionConfig;
use crate::error::Pdf2VideoError;
use crate::output::{ConversionOutput, ConversionStats, PageRecord};
use crate::pipeline::assemble::{AssemblyJob, FfmpegTranscoder, Transcoder};
use crate::pipeline::extract::{PageSource, PdfiumExtractor};
use crate::pipeline::frames;
use crate::pipeline::input;
use crate::pipeline::narrate::{self, CommandSpeechEngine, SpeechEngine};
use crate::pipeline::translate::{ChatTransport, ChatTranslator, PageTranslator, ReqwestTransport};
use crate::progress::Stage;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF into a narrated video.
///
/// # Arguments
/// * `input`: path to a local PDF file
/// * `config`: conversion configuration
///
/// # Errors
/// Every failure is fatal and returned as the first error encountered:
/// unreadable or invalid PDF, missing API key, translation service error,
/// speech engine failure, transcoder failure.
///
/// The video is not opened here; see [`crate::launch`] and
/// [`ConversionConfig::open_video`].
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2VideoError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());

    // ── Step 1: Validate input ───────────────────────────────────────────
    let pdf_path = input::resolve_local(input)?;
    let video_path = config.video_path()?;

    // ── Step 2: Extract text and images ──────────────────────────────────
    stage(config, Stage::Extracting);
    let extract_start = Instant::now();
    let extractor = resolve_extractor(config);
    let mut pages = extractor.extract(&pdf_path).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    let total_images: usize = pages.iter().map(|p| p.images.len()).sum();
    info!(
        "Extracted {} pages, {} images in {}ms",
        pages.len(),
        total_images,
        extract_duration_ms
    );

    // ── Step 3: Translate page by page ───────────────────────────────────
    let translator = resolve_translator(config)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(pages.len());
    }
    stage(config, Stage::Translating);
    let translate_start = Instant::now();
    translate_pages(translator.as_ref(), &mut pages, config).await?;
    let translate_duration_ms = translate_start.elapsed().as_millis() as u64;
    info!(
        "Translated {} pages in {}ms",
        pages.len(),
        translate_duration_ms
    );

    // ── Step 4: Narrate ──────────────────────────────────────────────────
    stage(config, Stage::Narrating);
    let narrate_start = Instant::now();
    let script = narrate::narration_text(&pages)?;
    let audio_path = config.audio_path();
    resolve_speech_engine(config)
        .synthesize(&script, &audio_path)
        .await?;
    let narrate_duration_ms = narrate_start.elapsed().as_millis() as u64;
    info!(
        "Narration written to {} in {}ms",
        audio_path.display(),
        narrate_duration_ms
    );

    // ── Step 5: Write frames ─────────────────────────────────────────────
    stage(config, Stage::WritingFrames);
    let frames_dir = config.frames_dir();
    let frame_paths = frames::materialize_frames(&pages, &frames_dir).await?;

    // ── Step 6: Assemble the video ───────────────────────────────────────
    stage(config, Stage::Assembling);
    let assemble_start = Instant::now();
    let job = AssemblyJob {
        frames_dir: frames_dir.clone(),
        frame_count: frame_paths.len(),
        audio_path: audio_path.clone(),
        output_path: video_path.clone(),
    };
    resolve_transcoder(config).assemble(&job).await?;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        total_pages: pages.len(),
        total_images,
        empty_pages: pages.iter().filter(|p| is_blank(&p.source_text)).count(),
        source_chars: pages.iter().map(|p| p.source_text.chars().count()).sum(),
        translated_chars: script.chars().count(),
        extract_duration_ms,
        translate_duration_ms,
        narrate_duration_ms,
        assemble_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} pages, {} frames, {}ms total → {}",
        stats.total_pages,
        frame_paths.len(),
        stats.total_duration_ms,
        video_path.display()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&video_path);
    }

    Ok(ConversionOutput {
        video_path,
        audio_path,
        frames_dir,
        frame_paths,
        pages,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2VideoError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2VideoError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, config))
}

fn stage(config: &ConversionConfig, stage: Stage) {
    debug!("Stage: {}", stage);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage(stage);
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn resolve_extractor(config: &ConversionConfig) -> Arc<dyn PageSource> {
    match config.extractor {
        Some(ref extractor) => Arc::clone(extractor),
        None => Arc::new(PdfiumExtractor::new(config.password.clone())),
    }
}

/// Pick the translator for this run.
///
/// 1. An injected [`PageTranslator`] is used as is.
/// 2. Otherwise a [`ChatTranslator`] is built over the injected
///    [`ChatTransport`], or over a fresh `reqwest` client. Building it reads
///    the API key, so a missing key fails here, before any request.
fn resolve_translator(
    config: &ConversionConfig,
) -> Result<Arc<dyn PageTranslator>, Pdf2VideoError> {
    if let Some(ref translator) = config.translator {
        return Ok(Arc::clone(translator));
    }

    let transport: Arc<dyn ChatTransport> = match config.transport {
        Some(ref transport) => Arc::clone(transport),
        None => Arc::new(ReqwestTransport::new(reqwest::Client::new())),
    };
    let translator = ChatTranslator::from_config(config, transport)?;
    debug!("Using {:?}", translator);
    Ok(Arc::new(translator))
}

fn resolve_speech_engine(config: &ConversionConfig) -> Arc<dyn SpeechEngine> {
    match config.speech_engine {
        Some(ref engine) => Arc::clone(engine),
        None => Arc::new(CommandSpeechEngine::new(config.voice.clone())),
    }
}

fn resolve_transcoder(config: &ConversionConfig) -> Arc<dyn Transcoder> {
    match config.transcoder {
        Some(ref transcoder) => Arc::clone(transcoder),
        None => Arc::new(FfmpegTranscoder::default()),
    }
}

/// Translate every page in order, one request at a time.
///
/// Blank pages are not sent; their translation is the empty string. The
/// first failure aborts the loop.
async fn translate_pages(
    translator: &dyn PageTranslator,
    pages: &mut [PageRecord],
    config: &ConversionConfig,
) -> Result<(), Pdf2VideoError> {
    let total_pages = pages.len();

    for page in pages.iter_mut() {
        let page_num = page.page_num;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let result = if is_blank(&page.source_text) {
            debug!("Page {} has no text, skipping translation", page_num);
            Ok(String::new())
        } else {
            translator
                .translate(&page.source_text)
                .await
                .map_err(|e| e.on_page(page_num))
        };

        match result {
            Ok(translated) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(page_num, total_pages, translated.len());
                }
                page.translated_text = Some(translated);
            }
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total_pages, &e.to_string());
                }
                return Err(e);
            }
        }
    }

    Ok(())
}
