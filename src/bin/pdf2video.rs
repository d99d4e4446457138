//! CLI binary for edgequake-pdf2video.
//!
//! A thin shim over the library crate: one optional PDF path, settings from
//! the environment, a progress bar on stderr.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2video::{
    convert, launch, ConversionConfig, ConversionProgressCallback, ProgressCallback, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: pdf2video <pdf-file>";

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner for the long single-shot stages, page counter while translating.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(Self::spinner_style());
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS)
    }

    fn page_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS)
    }

    fn page_elapsed(&self, page_num: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&page_num))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.bar.set_length(total_pages as u64);
        self.bar.reset_eta();
    }

    fn on_stage(&self, stage: Stage) {
        if stage == Stage::Translating {
            self.bar.set_style(Self::page_style());
        } else {
            self.bar.set_style(Self::spinner_style());
            self.bar.set_message("");
        }
        self.bar.set_prefix(stage.to_string());
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(page_num, Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, translated_len: usize) {
        let elapsed = self.page_elapsed(page_num);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{translated_len:>5} chars")),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let elapsed = self.page_elapsed(page_num);
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['…']).collect()
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, _video_path: &Path) {
        self.bar.finish_and_clear();
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pdf2video",
    version,
    about = "Turn a PDF into a narrated video",
    after_help = "ENVIRONMENT:\n  \
        OPENAI_API_KEY       API key for the translation service (required)\n  \
        PDF2VIDEO_MODEL      chat model (default gpt-3.5-turbo)\n  \
        PDF2VIDEO_API_BASE   OpenAI-compatible base URL\n  \
        PDF2VIDEO_VOICE      speech engine voice\n  \
        PDF2VIDEO_NO_OPEN    do not open the finished video\n  \
        PDFIUM_LIB_PATH      path to the pdfium shared library\n  \
        RUST_LOG             log filter, e.g. info or edgequake_pdf2video=debug"
)]
struct Cli {
    /// PDF file to convert
    input: Option<PathBuf>,
}

/// Non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Map environment variables to `ConversionConfig`.
fn build_config(progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder();

    if let Some(model) = env_var("PDF2VIDEO_MODEL") {
        builder = builder.model(model);
    }
    if let Some(base) = env_var("PDF2VIDEO_API_BASE") {
        builder = builder.api_base_url(base);
    }
    if let Some(voice) = env_var("PDF2VIDEO_VOICE") {
        builder = builder.voice(voice);
    }
    if env_var("PDF2VIDEO_NO_OPEN").is_some() {
        builder = builder.open_video(false);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Print the result line, then hand the video to `open_fn` if requested.
fn report_and_open(
    video_path: &Path,
    open: bool,
    out: &mut impl Write,
    open_fn: impl FnOnce(&Path),
) -> io::Result<()> {
    writeln!(out, "Video created at {}", video_path.display())?;
    out.flush()?;
    if open {
        open_fn(video_path);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(input) = cli.input else {
        println!("{USAGE}");
        return Ok(());
    };

    // ── Logging setup ────────────────────────────────────────────────────
    // With RUST_LOG set, logs replace the progress bar.
    let explicit_filter = std::env::var("RUST_LOG").is_ok();
    let show_progress = !explicit_filter && io::stderr().is_terminal();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(progress_cb)?;

    let output = convert(&input, &config)
        .await
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    report_and_open(
        &output.video_path,
        config.open_video,
        &mut io::stdout().lock(),
        launch::open_with_default_app,
    )
    .context("Failed to write to stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn no_argument_parses_to_none() {
        let cli = Cli::try_parse_from(["pdf2video"]).unwrap();
        assert!(cli.input.is_none());
    }

    #[test]
    fn positional_pdf_path() {
        let cli = Cli::try_parse_from(["pdf2video", "slides.pdf"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("slides.pdf")));
    }

    /// Writer that logs each write into a shared event list.
    struct EventWriter(Rc<RefCell<Vec<String>>>);

    impl Write for EventWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .borrow_mut()
                .push(String::from_utf8_lossy(buf).into_owned());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn video_path_is_printed_before_it_is_opened() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut out = EventWriter(Rc::clone(&events));
        let opened = Rc::clone(&events);

        report_and_open(Path::new("/work/video.mp4"), true, &mut out, |p| {
            opened.borrow_mut().push(format!("open {}", p.display()));
        })
        .unwrap();

        let events = events.borrow();
        assert_eq!(events.last().map(String::as_str), Some("open /work/video.mp4"));
        assert_eq!(
            events[..events.len() - 1].concat(),
            "Video created at /work/video.mp4\n"
        );
    }

    #[test]
    fn opening_can_be_disabled() {
        let mut out = Vec::new();
        report_and_open(Path::new("video.mp4"), false, &mut out, |_| {
            panic!("must not open")
        })
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Video created at video.mp4\n");
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["pdf2video", "a.pdf", "b.pdf"]).is_err());
    }
}
