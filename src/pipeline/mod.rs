//! Pipeline stages for PDF-to-video conversion.
//!
//! Each submodule implements exactly one step. The steps that talk to the
//! outside world (PDF library, HTTP API, speech engine, transcoder) expose a
//! small trait so the orchestration in [`crate::convert`] can run against
//! stubs in tests.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ translate ──▶ narrate ──▶ frames ──▶ assemble
//! (path)    (pdfium)    (chat API)    (TTS)       (PNGs)     (ffmpeg)
//! ```
//!
//! 1. [`input`]     — reject missing, unreadable, or non-PDF files early
//! 2. [`extract`]   — per-page text and images; `spawn_blocking` around pdfium
//! 3. [`encode`]    — re-encode every embedded image as PNG
//! 4. [`translate`] — one chat-completion call per page, in order
//! 5. [`narrate`]   — one WAV for the joined translations
//! 6. [`frames`]    — `frame001.png`, `frame002.png`, … in a scratch directory
//! 7. [`assemble`]  — 1 fps frames + narration → MP4

pub mod assemble;
pub mod encode;
pub mod extract;
pub mod frames;
pub mod input;
pub mod narrate;
pub mod translate;
