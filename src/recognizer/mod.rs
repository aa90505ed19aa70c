/*!
 * Recognizer backends for per-segment speech recognition.
 *
 * This module contains the adapter seam between the pipeline and the
 * external speech-recognition engine:
 * - Vosk: external recognizer process fed 16kHz mono WAV files
 * - Mock: deterministic in-process backend used by tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::app_config::{RecognizerBackend, RecognizerConfig};
use crate::errors::RecognizerError;

/// A single recognized word with timestamps relative to its segment
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpan {
    /// Recognized text
    pub text: String,

    /// Start time in ms, relative to the owning segment
    pub start_ms: u64,

    /// End time in ms, relative to the owning segment
    pub end_ms: u64,

    /// Engine confidence, when reported
    pub confidence: Option<f64>,
}

/// Common trait for all speech recognizer backends
///
/// Segments are independent recognition units; implementations hold no
/// shared mutable state between calls.
#[async_trait]
pub trait Recognizer: Send + Sync + Debug {
    /// Recognize one segment's audio file into chronological word spans.
    ///
    /// An empty result is valid: it means no speech was recognized.
    async fn recognize(&self, wav_path: &Path) -> Result<Vec<WordSpan>, RecognizerError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Create a recognizer backend from the configuration
pub fn create_recognizer(config: &RecognizerConfig) -> Result<Box<dyn Recognizer>, RecognizerError> {
    match config.backend {
        RecognizerBackend::Vosk => Ok(Box::new(vosk::VoskRecognizer::new(config)?)),
        RecognizerBackend::Mock => Ok(Box::new(mock::MockRecognizer::working())),
    }
}

pub mod vosk;
pub mod mock;
