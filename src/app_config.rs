use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Pipeline settings (segmentation and concurrency)
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Subtitle cue building and styling settings
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// Rendering and geometry settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Speech recognizer settings
    #[serde(default)]
    pub recognizer: RecognizerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Pipeline segmentation and scheduling settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Segment length in seconds
    #[serde(default = "default_segment_seconds")]
    pub segment_seconds: u64,

    /// Maximum number of segments processed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout in seconds for a single ffmpeg/ffprobe invocation
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segment_seconds: default_segment_seconds(),
            concurrency: default_concurrency(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

/// Subtitle cue building and styling settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Font file used for subtitle shaping
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,

    /// Subtitle font size in the 1080x1920 play resolution
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Vertical pixel offset of the subtitle line (0 = top, 1920 = bottom)
    #[serde(default = "default_pos_y")]
    pub pos_y: u32,

    /// Fade-in duration in milliseconds
    #[serde(default = "default_fade_ms")]
    pub fade_in_ms: u32,

    /// Fade-out duration in milliseconds
    #[serde(default = "default_fade_ms")]
    pub fade_out_ms: u32,

    /// Maximum characters per cue line before a new cue is started
    #[serde(default = "default_max_line_chars")]
    pub max_line_chars: usize,

    /// Maximum silence between words merged into the same cue, in milliseconds
    #[serde(default = "default_max_gap_ms")]
    pub max_gap_ms: u64,

    /// Minimum display duration of a cue, in milliseconds
    #[serde(default = "default_min_cue_ms")]
    pub min_cue_ms: u64,

    /// Maximum display duration of a cue, in milliseconds
    #[serde(default = "default_max_cue_ms")]
    pub max_cue_ms: u64,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            font_size: default_font_size(),
            pos_y: default_pos_y(),
            fade_in_ms: default_fade_ms(),
            fade_out_ms: default_fade_ms(),
            max_line_chars: default_max_line_chars(),
            max_gap_ms: default_max_gap_ms(),
            min_cue_ms: default_min_cue_ms(),
            max_cue_ms: default_max_cue_ms(),
        }
    }
}

/// Strategy for reprojecting the source frame onto the 9:16 target
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleStrategy {
    /// Scale down to fit and pad with black bars (nothing is cut off)
    #[default]
    Pad,
    /// Scale up to cover and crop the overflow (fills the frame)
    Crop,
}

impl ScaleStrategy {
    // @returns: Lowercase strategy identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Pad => "pad".to_string(),
            Self::Crop => "crop".to_string(),
        }
    }
}

impl std::fmt::Display for ScaleStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ScaleStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pad" => Ok(Self::Pad),
            "crop" => Ok(Self::Crop),
            _ => Err(anyhow!("Invalid scale strategy: {}", s)),
        }
    }
}

/// Rendering and geometry settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderConfig {
    /// Whether to burn subtitles into the pixel stream (true) or attach
    /// them as a selectable soft track (false)
    #[serde(default = "default_true")]
    pub burn_subs: bool,

    /// Target frame width
    #[serde(default = "default_target_width")]
    pub target_width: u32,

    /// Target frame height
    #[serde(default = "default_target_height")]
    pub target_height: u32,

    /// How the source frame is reprojected onto the 9:16 target
    #[serde(default)]
    pub scale_strategy: ScaleStrategy,

    /// x264 encoder preset
    #[serde(default = "default_preset")]
    pub preset: String,

    /// x264 constant rate factor
    #[serde(default = "default_crf")]
    pub crf: u32,

    /// Retry a failed segment render once before failing the run
    #[serde(default = "default_true")]
    pub retry_failed_segment: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            burn_subs: true,
            target_width: default_target_width(),
            target_height: default_target_height(),
            scale_strategy: ScaleStrategy::default(),
            preset: default_preset(),
            crf: default_crf(),
            retry_failed_segment: true,
        }
    }
}

/// Speech recognizer backend type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecognizerBackend {
    // @backend: External Vosk recognizer process
    #[default]
    Vosk,
    // @backend: Deterministic in-process mock (tests)
    Mock,
}

impl RecognizerBackend {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Vosk => "Vosk",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Vosk => "vosk".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for RecognizerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for RecognizerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "vosk" => Ok(Self::Vosk),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid recognizer backend: {}", s)),
        }
    }
}

/// Speech recognizer settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecognizerConfig {
    /// Recognizer backend to use
    #[serde(default)]
    pub backend: RecognizerBackend,

    /// Path to the acoustic/language model directory
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Recognizer executable invoked per segment
    #[serde(default = "default_recognizer_command")]
    pub command: String,

    /// Audio sample rate expected by the engine
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Timeout in seconds for one recognition run
    #[serde(default = "default_recognizer_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            backend: RecognizerBackend::default(),
            model_dir: default_model_dir(),
            command: default_recognizer_command(),
            sample_rate: default_sample_rate(),
            timeout_secs: default_recognizer_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_segment_seconds() -> u64 {
    60
}

fn default_concurrency() -> usize {
    2 // Encoder-bound work, keep the cap conservative
}

fn default_tool_timeout_secs() -> u64 {
    600 // A segment encode can legitimately take minutes
}

fn default_font_path() -> PathBuf {
    PathBuf::from("assets/oswald/static/Oswald-Bold.ttf")
}

fn default_font_size() -> u32 {
    100
}

fn default_pos_y() -> u32 {
    1500 // Slightly below center of the 1920px frame
}

fn default_fade_ms() -> u32 {
    200
}

fn default_max_line_chars() -> usize {
    60
}

fn default_max_gap_ms() -> u64 {
    800
}

fn default_min_cue_ms() -> u64 {
    300
}

fn default_max_cue_ms() -> u64 {
    7000
}

fn default_target_width() -> u32 {
    1080
}

fn default_target_height() -> u32 {
    1920
}

fn default_preset() -> String {
    "fast".to_string()
}

fn default_crf() -> u32 {
    23
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("vosk-model-small-ru-0.22")
}

fn default_recognizer_command() -> String {
    "vosk-transcriber".to_string()
}

fn default_sample_rate() -> u32 {
    16000 // 16kHz mono PCM is what the Vosk models expect
}

fn default_recognizer_timeout_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.segment_seconds == 0 {
            return Err(anyhow!("segment_seconds must be greater than zero"));
        }

        if self.pipeline.concurrency == 0 {
            return Err(anyhow!("concurrency must be greater than zero"));
        }

        if self.subtitle.max_line_chars == 0 {
            return Err(anyhow!("max_line_chars must be greater than zero"));
        }

        if self.subtitle.min_cue_ms > self.subtitle.max_cue_ms {
            return Err(anyhow!(
                "min_cue_ms ({}) must not exceed max_cue_ms ({})",
                self.subtitle.min_cue_ms,
                self.subtitle.max_cue_ms
            ));
        }

        if self.render.target_width == 0 || self.render.target_height == 0 {
            return Err(anyhow!("target frame dimensions must be non-zero"));
        }

        // The model directory is required before any processing starts, but
        // only for the backend that actually loads one.
        if self.recognizer.backend == RecognizerBackend::Vosk
            && !Path::new(&self.recognizer.model_dir).is_dir()
        {
            return Err(anyhow!(
                "Recognizer model directory not found: {}",
                self.recognizer.model_dir.display()
            ));
        }

        // Burned subtitles are shaped with the bundled font; without the
        // file libass silently falls back to a system font
        if self.render.burn_subs && !self.subtitle.font_path.is_file() {
            return Err(anyhow!(
                "Subtitle font file not found: {}",
                self.subtitle.font_path.display()
            ));
        }

        Ok(())
    }

    /// Font name used in the ASS style line (file stem of the font path)
    pub fn font_name(&self) -> String {
        self.subtitle
            .font_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Arial".to_string())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            pipeline: PipelineConfig::default(),
            subtitle: SubtitleConfig::default(),
            render: RenderConfig::default(),
            recognizer: RecognizerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
