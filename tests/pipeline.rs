//! Pipeline integration tests.
//!
//! Every external collaborator (pdfium, the chat API, the speech engine,
//! ffmpeg) is replaced with an in-memory stub, so these run anywhere:
//!
//!   cargo test --test pipeline

use async_trait::async_trait;
use edgequake_pdf2video::{
    convert, AssemblyJob, ChatCompletionRequest, ChatTransport, ConversionConfig,
    ConversionProgressCallback, ErrorKind, FfmpegTranscoder, PageRecord, PageSource,
    PageTranslator, Pdf2VideoError, SpeechEngine, Stage, Transcoder, TransportResponse,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Stubs ────────────────────────────────────────────────────────────────────

/// Returns a fixed list of pages and counts calls.
struct FixedPages {
    pages: Vec<PageRecord>,
    calls: AtomicUsize,
}

impl FixedPages {
    fn new(pages: Vec<PageRecord>) -> Arc<Self> {
        Arc::new(Self {
            pages,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PageSource for FixedPages {
    async fn extract(&self, _pdf_path: &Path) -> Result<Vec<PageRecord>, Pdf2VideoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.clone())
    }
}

/// Dictionary translator; unknown text passes through unchanged.
struct Dictionary(HashMap<&'static str, &'static str>);

impl Dictionary {
    fn hello_world() -> Arc<Self> {
        Arc::new(Self(HashMap::from([("Hello", "Merhaba"), ("World", "Dünya")])))
    }
}

#[async_trait]
impl PageTranslator for Dictionary {
    async fn translate(&self, text: &str) -> Result<String, Pdf2VideoError> {
        Ok(self.0.get(text).copied().unwrap_or(text).to_string())
    }
}

/// HTTP stub: replies with `status` and either a completion echoing the
/// user message in upper case (2xx) or an error body.
struct StubTransport {
    status: u16,
    calls: AtomicUsize,
}

impl StubTransport {
    fn new(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn post_json(
        &self,
        _url: &str,
        _bearer_token: &str,
        body: &ChatCompletionRequest,
    ) -> Result<TransportResponse, Pdf2VideoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = if (200..300).contains(&self.status) {
            let user = body
                .messages
                .iter()
                .find(|m| m.role == "user")
                .map(|m| m.content.to_uppercase())
                .unwrap_or_default();
            serde_json::json!({ "choices": [{ "message": { "content": user } }] }).to_string()
        } else {
            r#"{"error":{"message":"rate limited"}}"#.to_string()
        };
        Ok(TransportResponse {
            status: self.status,
            body,
        })
    }
}

/// Records every script it is asked to speak and writes a placeholder file.
#[derive(Default)]
struct RecordingNarrator {
    scripts: Mutex<Vec<(String, PathBuf)>>,
}

#[async_trait]
impl SpeechEngine for RecordingNarrator {
    async fn synthesize(&self, text: &str, audio_path: &Path) -> Result<(), Pdf2VideoError> {
        self.scripts
            .lock()
            .unwrap()
            .push((text.to_string(), audio_path.to_path_buf()));
        if let Some(parent) = audio_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(audio_path, b"RIFF").unwrap();
        Ok(())
    }
}

/// Records every job and the frame files present when it ran.
#[derive(Default)]
struct RecordingTranscoder {
    jobs: Mutex<Vec<(AssemblyJob, Vec<String>)>>,
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    async fn assemble(&self, job: &AssemblyJob) -> Result<(), Pdf2VideoError> {
        let mut names: Vec<String> = std::fs::read_dir(&job.frames_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        self.jobs.lock().unwrap().push((job.clone(), names));
        Ok(())
    }
}

#[derive(Default)]
struct StageLog(Mutex<Vec<Stage>>);

impl ConversionProgressCallback for StageLog {
    fn on_stage(&self, stage: Stage) {
        self.0.lock().unwrap().push(stage);
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A scratch dir with a file that passes the `%PDF` check.
fn fake_pdf() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pdf");
    std::fs::write(&path, b"%PDF-1.7\n%%EOF\n").unwrap();
    (dir, path)
}

fn page(num: usize, text: &str, images: &[&[u8]]) -> PageRecord {
    images
        .iter()
        .fold(PageRecord::new(num, text), |p, img| p.with_image(img.to_vec()))
}

/// Config wired to the given stubs, writing into `work_dir`, never opening
/// the result.
fn stub_config(
    work_dir: &Path,
    extractor: Arc<FixedPages>,
    narrator: Arc<RecordingNarrator>,
    transcoder: Arc<dyn Transcoder>,
) -> ConversionConfig {
    ConversionConfig::builder()
        .api_key("sk-test")
        .work_dir(work_dir)
        .open_video(false)
        .extractor(extractor)
        .speech_engine(narrator)
        .transcoder(transcoder)
        .build()
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn hello_world_end_to_end() {
    let (dir, pdf) = fake_pdf();
    let work = dir.path().join("work");
    let extractor = FixedPages::new(vec![
        page(1, "Hello", &[b"image-1"]),
        page(2, "World", &[]),
    ]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(RecordingTranscoder::default());

    let mut config = stub_config(&work, extractor, narrator.clone(), transcoder.clone());
    config.translator = Some(Dictionary::hello_world());

    let output = convert(&pdf, &config).await.unwrap();

    let scripts = narrator.scripts.lock().unwrap();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].0, "Merhaba\nDünya");
    assert_eq!(scripts[0].1, work.join("output.wav"));

    let jobs = transcoder.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    let (job, frames) = &jobs[0];
    assert_eq!(frames, &vec!["frame001.png".to_string()]);
    assert_eq!(job.frame_count, 1);
    assert_eq!(job.frames_dir, work.join("frames"));
    assert_eq!(job.audio_path, work.join("output.wav"));
    assert_eq!(
        std::fs::read(work.join("frames/frame001.png")).unwrap(),
        b"image-1"
    );

    let expected_video = std::env::current_dir().unwrap().join("video.mp4");
    assert_eq!(job.output_path, expected_video);
    assert_eq!(output.video_path, expected_video);

    assert_eq!(output.stats.total_pages, 2);
    assert_eq!(output.stats.total_images, 1);
    assert_eq!(
        output.pages[1].translated_text.as_deref(),
        Some("Dünya")
    );
}

#[tokio::test]
async fn frames_follow_page_then_image_order() {
    let (dir, pdf) = fake_pdf();
    let extractor = FixedPages::new(vec![
        page(1, "a", &[b"p1-i1", b"p1-i2"]),
        page(2, "b", &[]),
        page(3, "c", &[b"p3-i1", b"p3-i2", b"p3-i3"]),
    ]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(RecordingTranscoder::default());

    let mut config = stub_config(dir.path(), extractor, narrator, transcoder.clone());
    config.translator = Some(Dictionary::hello_world());

    let output = convert(&pdf, &config).await.unwrap();

    assert_eq!(output.frame_paths.len(), 5);
    let contents: Vec<Vec<u8>> = output
        .frame_paths
        .iter()
        .map(|p| std::fs::read(p).unwrap())
        .collect();
    assert_eq!(
        contents,
        vec![
            b"p1-i1".to_vec(),
            b"p1-i2".to_vec(),
            b"p3-i1".to_vec(),
            b"p3-i2".to_vec(),
            b"p3-i3".to_vec(),
        ]
    );

    let jobs = transcoder.jobs.lock().unwrap();
    assert_eq!(
        jobs[0].1,
        vec![
            "frame001.png",
            "frame002.png",
            "frame003.png",
            "frame004.png",
            "frame005.png"
        ]
    );
}

#[tokio::test]
async fn zero_images_still_reaches_the_assembler() {
    let (dir, pdf) = fake_pdf();
    let extractor = FixedPages::new(vec![page(1, "Hello", &[]), page(2, "World", &[])]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(RecordingTranscoder::default());

    let mut config = stub_config(dir.path(), extractor, narrator, transcoder.clone());
    config.translator = Some(Dictionary::hello_world());

    let output = convert(&pdf, &config).await.unwrap();

    assert!(output.frame_paths.is_empty());
    let jobs = transcoder.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].0.frame_count, 0);
    assert!(jobs[0].1.is_empty());
}

#[tokio::test]
async fn zero_images_with_ffmpeg_reports_no_frames() {
    let (dir, pdf) = fake_pdf();
    let extractor = FixedPages::new(vec![page(1, "Hello", &[])]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(FfmpegTranscoder::new("pdf2video-no-such-ffmpeg"));

    let mut config = stub_config(dir.path(), extractor, narrator, transcoder);
    config.translator = Some(Dictionary::hello_world());

    let err = convert(&pdf, &config).await.unwrap_err();
    assert!(matches!(err, Pdf2VideoError::NoFrames { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::Transcode);
}

#[tokio::test]
async fn missing_credential_aborts_before_any_request() {
    let (dir, pdf) = fake_pdf();
    let extractor = FixedPages::new(vec![page(1, "Hello", &[b"img"])]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(RecordingTranscoder::default());
    let transport = StubTransport::new(200);

    let config = ConversionConfig::builder()
        .api_key_env("PDF2VIDEO_TEST_KEY_THAT_IS_NEVER_SET_91C2")
        .work_dir(dir.path())
        .open_video(false)
        .extractor(extractor)
        .transport(transport.clone())
        .speech_engine(narrator.clone())
        .transcoder(transcoder.clone())
        .build()
        .unwrap();

    let err = convert(&pdf, &config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingCredential);
    assert!(err.to_string().contains("PDF2VIDEO_TEST_KEY_THAT_IS_NEVER_SET_91C2"));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    assert!(narrator.scripts.lock().unwrap().is_empty());
    assert!(transcoder.jobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn error_status_aborts_before_narration_and_frames() {
    let (dir, pdf) = fake_pdf();
    let extractor = FixedPages::new(vec![
        page(1, "Hello", &[b"img-1"]),
        page(2, "World", &[b"img-2"]),
    ]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(RecordingTranscoder::default());
    let transport = StubTransport::new(429);

    let mut config = stub_config(dir.path(), extractor, narrator.clone(), transcoder.clone());
    config.transport = Some(transport.clone());

    let err = convert(&pdf, &config).await.unwrap_err();

    match &err {
        Pdf2VideoError::TranslationService { page, status, .. } => {
            assert_eq!(*page, Some(1));
            assert_eq!(*status, Some(429));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert!(narrator.scripts.lock().unwrap().is_empty());
    assert!(transcoder.jobs.lock().unwrap().is_empty());
    assert!(!dir.path().join("frames").exists());
}

#[tokio::test]
async fn chat_translator_sends_one_request_per_non_blank_page() {
    let (dir, pdf) = fake_pdf();
    let extractor = FixedPages::new(vec![
        page(1, "first", &[b"a"]),
        page(2, "   ", &[]),
        page(3, "third", &[]),
    ]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(RecordingTranscoder::default());
    let transport = StubTransport::new(200);

    let mut config = stub_config(dir.path(), extractor, narrator.clone(), transcoder);
    config.transport = Some(transport.clone());

    convert(&pdf, &config).await.unwrap();

    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    assert_eq!(narrator.scripts.lock().unwrap()[0].0, "FIRST\n\nTHIRD");
}

#[tokio::test]
async fn missing_input_fails_before_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = FixedPages::new(vec![]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(RecordingTranscoder::default());

    let config = stub_config(dir.path(), extractor.clone(), narrator, transcoder);
    let err = convert(dir.path().join("absent.pdf"), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Pdf2VideoError::FileNotFound { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::DocumentOpen);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stages_are_reported_in_order() {
    let (dir, pdf) = fake_pdf();
    let extractor = FixedPages::new(vec![page(1, "Hello", &[b"img"])]);
    let narrator = Arc::new(RecordingNarrator::default());
    let transcoder = Arc::new(RecordingTranscoder::default());
    let log = Arc::new(StageLog::default());

    let mut config = stub_config(dir.path(), extractor, narrator, transcoder);
    config.translator = Some(Dictionary::hello_world());
    config.progress_callback = Some(log.clone());

    convert(&pdf, &config).await.unwrap();

    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            Stage::Extracting,
            Stage::Translating,
            Stage::Narrating,
            Stage::WritingFrames,
            Stage::Assembling,
        ]
    );
}
