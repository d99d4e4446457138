//! Narration: synthesize one speech track for the whole document.
//!
//! The text to speak is every page's translation joined by a single newline,
//! in page order ([`narration_text`]). The speech engine itself sits behind
//! [`SpeechEngine`]; the default [`CommandSpeechEngine`] drives whatever the
//! platform ships with:
//!
//! | Platform | Engine | Output |
//! |----------|--------|--------|
//! | Linux / BSD | `espeak-ng` (or `espeak`) | `-w file.wav` |
//! | macOS | `say` | `--file-format=WAVE` |
//! | Windows | PowerShell + `System.Speech` | `SetOutputToWaveFile` |
//!
//! The text goes through a sidecar `.txt` file next to the audio so long
//! documents never hit command-line length limits.
//!
//! No voice is chosen from the target language. With the engine's default
//! voice a Turkish script may be read with English phonetics, or rejected.

use crate::error::Pdf2VideoError;
use crate::output::PageRecord;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Turn text into a WAV file.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, text: &str, audio_path: &Path) -> Result<(), Pdf2VideoError>;
}

/// Join every page's translation with `\n`, in page order.
///
/// Fails if any page has not been translated yet.
pub fn narration_text(pages: &[PageRecord]) -> Result<String, Pdf2VideoError> {
    let parts = pages
        .iter()
        .map(|p| {
            p.translated_text.as_deref().ok_or_else(|| {
                Pdf2VideoError::Internal(format!(
                    "page {} reached narration untranslated",
                    p.page_num
                ))
            })
        })
        .collect::<Result<Vec<&str>, _>>()?;
    Ok(parts.join("\n"))
}

/// The command-line engines [`CommandSpeechEngine`] knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    EspeakNg,
    Espeak,
    Say,
    PowerShell,
}

impl EngineKind {
    pub fn program(self) -> &'static str {
        match self {
            EngineKind::EspeakNg => "espeak-ng",
            EngineKind::Espeak => "espeak",
            EngineKind::Say => "say",
            EngineKind::PowerShell => "powershell",
        }
    }

    /// Engines worth trying on this platform, most preferred first.
    pub fn platform_candidates() -> &'static [EngineKind] {
        if cfg!(target_os = "macos") {
            &[EngineKind::Say]
        } else if cfg!(target_os = "windows") {
            &[EngineKind::PowerShell]
        } else {
            &[EngineKind::EspeakNg, EngineKind::Espeak]
        }
    }
}

/// Quote a string for a single-quoted PowerShell literal.
fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Speech engine that shells out to the platform TTS program.
#[derive(Debug, Clone, Default)]
pub struct CommandSpeechEngine {
    /// Fixed engine; `None` picks the first platform candidate on PATH.
    kind: Option<EngineKind>,
    voice: Option<String>,
    /// Binary to run instead of the engine's default program name.
    program: Option<String>,
}

impl CommandSpeechEngine {
    pub fn new(voice: Option<String>) -> Self {
        Self {
            kind: None,
            voice,
            program: None,
        }
    }

    pub fn with_kind(kind: EngineKind, voice: Option<String>) -> Self {
        Self {
            kind: Some(kind),
            voice,
            program: None,
        }
    }

    /// Run a specific binary (e.g. a full path) that speaks `kind`'s arguments.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    fn resolve_kind(&self) -> Result<EngineKind, Pdf2VideoError> {
        if let Some(kind) = self.kind {
            return Ok(kind);
        }
        let candidates = EngineKind::platform_candidates();
        candidates
            .iter()
            .copied()
            .find(|k| which::which(k.program()).is_ok())
            .ok_or_else(|| Pdf2VideoError::SpeechSynthesis {
                engine: candidates
                    .iter()
                    .map(|k| k.program())
                    .collect::<Vec<_>>()
                    .join(" / "),
                detail: "no speech engine found on PATH. Please install one.".into(),
            })
    }

    /// Arguments for `kind`, reading `text_path` and writing `audio_path`.
    pub fn args(&self, kind: EngineKind, text_path: &Path, audio_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        match kind {
            EngineKind::EspeakNg | EngineKind::Espeak => {
                if let Some(ref v) = self.voice {
                    args.extend(["-v".into(), v.into()]);
                }
                args.extend([
                    "-f".into(),
                    text_path.into(),
                    "-w".into(),
                    audio_path.into(),
                ]);
            }
            EngineKind::Say => {
                if let Some(ref v) = self.voice {
                    args.extend(["-v".into(), v.into()]);
                }
                args.extend([
                    "-f".into(),
                    text_path.into(),
                    "-o".into(),
                    audio_path.into(),
                    "--file-format=WAVE".into(),
                    "--data-format=LEI16@22050".into(),
                ]);
            }
            EngineKind::PowerShell => {
                let select_voice = self
                    .voice
                    .as_deref()
                    .map(|v| format!("$s.SelectVoice({}); ", ps_quote(v)))
                    .unwrap_or_default();
                let script = format!(
                    "Add-Type -AssemblyName System.Speech; \
                     $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
                     {select_voice}\
                     $s.SetOutputToWaveFile({wav}); \
                     $s.Speak([IO.File]::ReadAllText({txt}, [Text.Encoding]::UTF8)); \
                     $s.Dispose()",
                    wav = ps_quote(&audio_path.to_string_lossy()),
                    txt = ps_quote(&text_path.to_string_lossy()),
                );
                args.extend([
                    "-NoProfile".into(),
                    "-NonInteractive".into(),
                    "-Command".into(),
                    script.into(),
                ]);
            }
        }
        args
    }
}

/// Sidecar text file next to the audio output.
fn script_path(audio_path: &Path) -> PathBuf {
    audio_path.with_extension("txt")
}

#[async_trait]
impl SpeechEngine for CommandSpeechEngine {
    async fn synthesize(&self, text: &str, audio_path: &Path) -> Result<(), Pdf2VideoError> {
        let kind = self.resolve_kind()?;
        let engine = self
            .program
            .clone()
            .unwrap_or_else(|| kind.program().to_string());
        let fail = |detail: String| Pdf2VideoError::SpeechSynthesis {
            engine: engine.clone(),
            detail,
        };

        if let Some(parent) = audio_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| fail(format!("creating {}: {e}", parent.display())))?;
        }

        // A leftover file from an earlier run would hide an engine that
        // exits 0 without writing anything.
        match tokio::fs::remove_file(audio_path).await {
            Ok(()) => debug!("Removed previous {}", audio_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(fail(format!("removing {}: {e}", audio_path.display()))),
        }

        let text_path = script_path(audio_path);
        tokio::fs::write(&text_path, text)
            .await
            .map_err(|e| fail(format!("writing {}: {e}", text_path.display())))?;

        let args = self.args(kind, &text_path, audio_path);
        info!("Synthesizing {} chars with {}", text.chars().count(), engine);
        debug!("{} {:?}", engine, args);

        let output = Command::new(&engine)
            .args(&args)
            .output()
            .await
            .map_err(|e| fail(format!("failed to start: {e}")))?;

        if !output.status.success() {
            return Err(fail(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let written = tokio::fs::metadata(audio_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(fail(format!("no audio written to {}", audio_path.display())));
        }

        debug!("Narration: {} bytes → {}", written, audio_path.display());
        Ok(())
    }
}
