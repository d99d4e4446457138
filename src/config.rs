//! Configuration types for PDF-to-video conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The four external collaborators
//! (PDF extractor, translator, speech engine, transcoder) can each be swapped
//! for a custom implementation here; anything left as `None` is resolved to
//! the built-in default when the pipeline starts.

use crate::error::Pdf2VideoError;
use crate::pipeline::assemble::Transcoder;
use crate::pipeline::extract::PageSource;
use crate::pipeline::narrate::SpeechEngine;
use crate::pipeline::translate::{ChatTransport, PageTranslator};
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default chat-completion model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable holding the translation API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Name of the narration file inside the work directory.
pub const AUDIO_FILE_NAME: &str = "output.wav";

/// Name of the frame directory inside the work directory.
pub const FRAMES_DIR_NAME: &str = "frames";

/// Name of the final video inside the output directory.
pub const VIDEO_FILE_NAME: &str = "video.mp4";

/// Configuration for a PDF-to-video conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2video::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .target_language("German")
///     .model("gpt-4o-mini")
///     .open_video(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Language the PDF is written in. Default: "English".
    pub source_language: String,

    /// Language the narration is spoken in. Default: "Turkish".
    pub target_language: String,

    /// Chat-completion model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Base URL of the OpenAI-compatible API; `/chat/completions` is appended.
    pub api_base_url: String,

    /// Explicit API key. When `None`, read from `api_key_env`.
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is `None`.
    pub api_key_env: String,

    /// Custom system instruction. If None, built from the language pair.
    pub system_prompt: Option<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Voice name handed to the speech engine verbatim.
    ///
    /// Nothing picks a voice from `target_language`; if the engine's default
    /// voice does not speak the target language the narration will sound
    /// wrong, or the engine will fail.
    pub voice: Option<String>,

    /// Directory for the narration audio and the frame directory.
    /// Default: the system temporary directory.
    pub work_dir: Option<PathBuf>,

    /// Final video path. Default: `video.mp4` in the current directory.
    pub output_path: Option<PathBuf>,

    /// Whether the caller should open the finished video with the OS default
    /// player once it has reported it. Default: true.
    pub open_video: bool,

    /// Pre-built document extractor. Default: pdfium.
    pub extractor: Option<Arc<dyn PageSource>>,

    /// Pre-built translator. Takes precedence over `transport`.
    pub translator: Option<Arc<dyn PageTranslator>>,

    /// HTTP transport for the built-in translator. Default: a fresh `reqwest` client.
    pub transport: Option<Arc<dyn ChatTransport>>,

    /// Pre-built speech engine. Default: the platform command-line engine.
    pub speech_engine: Option<Arc<dyn SpeechEngine>>,

    /// Pre-built transcoder. Default: `ffmpeg` on PATH.
    pub transcoder: Option<Arc<dyn Transcoder>>,

    /// Optional progress callback for per-page and per-stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_language: "English".to_string(),
            target_language: "Turkish".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            system_prompt: None,
            password: None,
            voice: None,
            work_dir: None,
            output_path: None,
            open_video: true,
            extractor: None,
            translator: None,
            transport: None,
            speech_engine: None,
            transcoder: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("voice", &self.voice)
            .field("work_dir", &self.work_dir)
            .field("output_path", &self.output_path)
            .field("open_video", &self.open_video)
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn PageSource>"))
            .field("translator", &self.translator.as_ref().map(|_| "<dyn PageTranslator>"))
            .field("transport", &self.transport.as_ref().map(|_| "<dyn ChatTransport>"))
            .field("speech_engine", &self.speech_engine.as_ref().map(|_| "<dyn SpeechEngine>"))
            .field("transcoder", &self.transcoder.as_ref().map(|_| "<dyn Transcoder>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Directory holding the narration and the frames.
    pub fn resolved_work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Where the narration WAV is written.
    pub fn audio_path(&self) -> PathBuf {
        self.resolved_work_dir().join(AUDIO_FILE_NAME)
    }

    /// Where the numbered frames are written.
    pub fn frames_dir(&self) -> PathBuf {
        self.resolved_work_dir().join(FRAMES_DIR_NAME)
    }

    /// Absolute path of the final video.
    pub fn video_path(&self) -> Result<PathBuf, Pdf2VideoError> {
        if let Some(ref p) = self.output_path {
            return Ok(p.clone());
        }
        let cwd = std::env::current_dir().map_err(|e| {
            Pdf2VideoError::Internal(format!("Cannot resolve current directory: {e}"))
        })?;
        Ok(cwd.join(VIDEO_FILE_NAME))
    }

    /// Full URL of the chat-completion endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base_url.trim_end_matches('/'))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn source_language(mut self, lang: impl Into<String>) -> Self {
        self.config.source_language = lang.into();
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.config.target_language = lang.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.config.api_key_env = var.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.config.voice = Some(voice.into());
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = Some(dir.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = Some(path.into());
        self
    }

    pub fn open_video(mut self, v: bool) -> Self {
        self.config.open_video = v;
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn PageSource>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn translator(mut self, translator: Arc<dyn PageTranslator>) -> Self {
        self.config.translator = Some(translator);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn speech_engine(mut self, engine: Arc<dyn SpeechEngine>) -> Self {
        self.config.speech_engine = Some(engine);
        self
    }

    pub fn transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.config.transcoder = Some(transcoder);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2VideoError> {
        let c = &self.config;
        if c.source_language.trim().is_empty() || c.target_language.trim().is_empty() {
            return Err(Pdf2VideoError::InvalidConfig(
                "Source and target language must not be empty".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(Pdf2VideoError::InvalidConfig("Model must not be empty".into()));
        }
        if !(c.api_base_url.starts_with("http://") || c.api_base_url.starts_with("https://")) {
            return Err(Pdf2VideoError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        if c.api_key.is_none() && c.api_key_env.trim().is_empty() {
            return Err(Pdf2VideoError::InvalidConfig(
                "Either an API key or the name of its environment variable is required".into(),
            ));
        }
        Ok(self.config)
    }
}
