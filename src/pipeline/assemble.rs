//! Video assembly: mux the numbered frames and the narration into an MP4.
//!
//! The default [`FfmpegTranscoder`] runs one fixed command line:
//!
//! ```text
//! ffmpeg -y -r 1 -i <frames>/frame%03d.png -i <audio> \
//!        -c:v libx264 -c:a aac -strict experimental -shortest <output>
//! ```
//!
//! Each frame is shown for one second and `-shortest` cuts the output at the
//! end of whichever stream runs out first. The video length therefore
//! depends only on the frame count, never on how long the narration is: a
//! three-image deck with five minutes of speech yields a three-second video.

use crate::error::Pdf2VideoError;
use crate::pipeline::frames::FRAME_PATTERN;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Input frame rate, in frames per second.
pub const FRAME_RATE: u32 = 1;

/// Lines of transcoder stderr kept in [`Pdf2VideoError::TranscodeFailed`].
const STDERR_TAIL_LINES: usize = 20;

/// Everything the transcoder needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyJob {
    pub frames_dir: PathBuf,
    pub frame_count: usize,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
}

/// Turn frames plus audio into a video file.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn assemble(&self, job: &AssemblyJob) -> Result<(), Pdf2VideoError>;
}

/// [`Transcoder`] that shells out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegTranscoder {
    /// Use a specific binary name or path instead of `ffmpeg`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The fixed argument list for `job`.
    pub fn args(&self, job: &AssemblyJob) -> Vec<OsString> {
        let rate = FRAME_RATE.to_string();
        let mut args: Vec<OsString> = vec!["-y".into(), "-r".into(), rate.into(), "-i".into()];
        args.push(job.frames_dir.join(FRAME_PATTERN).into_os_string());
        args.push("-i".into());
        args.push(job.audio_path.clone().into_os_string());
        args.extend(
            ["-c:v", "libx264", "-c:a", "aac", "-strict", "experimental", "-shortest"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(job.output_path.clone().into_os_string());
        args
    }

    fn not_found(&self) -> Pdf2VideoError {
        Pdf2VideoError::TranscoderNotFound {
            program: self.program.clone(),
        }
    }
}

/// Last `n` lines of `stderr`, which is where ffmpeg puts the actual error.
fn stderr_tail(stderr: &[u8], n: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

async fn ensure_parent(path: &Path) -> Result<(), Pdf2VideoError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Pdf2VideoError::Internal(format!("creating {}: {e}", parent.display()))),
        _ => Ok(()),
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn assemble(&self, job: &AssemblyJob) -> Result<(), Pdf2VideoError> {
        // ffmpeg fails on an empty image sequence with a confusing
        // "No such file" for frame%03d.png; report the real cause instead.
        if job.frame_count == 0 {
            return Err(Pdf2VideoError::NoFrames {
                frames_dir: job.frames_dir.clone(),
            });
        }

        if which::which(&self.program).is_err() {
            return Err(self.not_found());
        }

        ensure_parent(&job.output_path).await?;

        let args = self.args(job);
        info!(
            "Assembling {} frames + {} → {}",
            job.frame_count,
            job.audio_path.display(),
            job.output_path.display()
        );
        debug!("{} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => self.not_found(),
                _ => Pdf2VideoError::TranscodeFailed {
                    program: self.program.clone(),
                    code: None,
                    stderr: format!("failed to start: {e}"),
                },
            })?;

        if !output.status.success() {
            return Err(Pdf2VideoError::TranscodeFailed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: stderr_tail(&output.stderr, STDERR_TAIL_LINES),
            });
        }

        Ok(())
    }
}
