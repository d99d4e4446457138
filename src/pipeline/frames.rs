//! Frame materialisation: write every extracted image as a numbered PNG.
//!
//! Images are flattened in (page order, within-page order) and numbered from
//! 1 with no gaps: `frame001.png`, `frame002.png`, … The transcoder reads
//! them back with the matching [`FRAME_PATTERN`].
//!
//! The pattern is fixed-width. Past 999 frames the names grow to four
//! digits (`frame1000.png`) and no longer match the three-digit contract;
//! that case is logged, not worked around.

use crate::error::Pdf2VideoError;
use crate::output::PageRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// printf-style pattern handed to the transcoder.
pub const FRAME_PATTERN: &str = "frame%03d.png";

/// Highest frame index the three-digit pattern can express.
pub const MAX_FIXED_WIDTH_FRAMES: usize = 999;

/// File name for the 1-indexed frame `index`.
pub fn frame_file_name(index: usize) -> String {
    format!("frame{index:03}.png")
}

/// True for names this module writes (`frame` + digits + `.png`).
fn is_frame_file(name: &str) -> bool {
    name.strip_prefix("frame")
        .and_then(|rest| rest.strip_suffix(".png"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Delete frames left behind by an earlier run so they can't leak into this video.
async fn remove_stale_frames(frames_dir: &Path) -> Result<usize, Pdf2VideoError> {
    let io_err = |source: std::io::Error| Pdf2VideoError::FrameWriteFailed {
        path: frames_dir.to_path_buf(),
        source,
    };

    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(frames_dir).await.map_err(io_err)?;
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let name = entry.file_name();
        if name.to_str().is_some_and(is_frame_file) {
            tokio::fs::remove_file(entry.path())
                .await
                .map_err(|source| Pdf2VideoError::FrameWriteFailed {
                    path: entry.path(),
                    source,
                })?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Write all images of all pages to `frames_dir`, creating it if absent.
///
/// Returns the written paths in frame order.
pub async fn materialize_frames(
    pages: &[PageRecord],
    frames_dir: &Path,
) -> Result<Vec<PathBuf>, Pdf2VideoError> {
    tokio::fs::create_dir_all(frames_dir)
        .await
        .map_err(|source| Pdf2VideoError::FrameWriteFailed {
            path: frames_dir.to_path_buf(),
            source,
        })?;

    let stale = remove_stale_frames(frames_dir).await?;
    if stale > 0 {
        debug!("Removed {} stale frames from {}", stale, frames_dir.display());
    }

    let total: usize = pages.iter().map(|p| p.images.len()).sum();
    if total > MAX_FIXED_WIDTH_FRAMES {
        warn!(
            "{} frames exceed the {}-frame limit of pattern {}; frames past {} will not match it",
            total, MAX_FIXED_WIDTH_FRAMES, FRAME_PATTERN, MAX_FIXED_WIDTH_FRAMES
        );
    }

    let mut written = Vec::with_capacity(total);
    let images = pages.iter().flat_map(|p| p.images.iter());

    for (i, png) in images.enumerate() {
        let path = frames_dir.join(frame_file_name(i + 1));
        tokio::fs::write(&path, png)
            .await
            .map_err(|source| Pdf2VideoError::FrameWriteFailed {
                path: path.clone(),
                source,
            })?;
        written.push(path);
    }

    info!("Wrote {} frames to {}", written.len(), frames_dir.display());
    Ok(written)
}
