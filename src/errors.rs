/*!
 * Error types for the vertisub application.
 *
 * This module contains custom error types for the pipeline stages,
 * using the thiserror crate for ergonomic error definitions. Fatal
 * application-level failures are reported through `anyhow` contexts
 * at the controller seams.
 */

use thiserror::Error;

/// Errors that can occur when probing media files
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Error when the ffprobe process could not be started
    #[error("failed to invoke ffprobe: {0}")]
    InvocationFailed(String),

    /// Error when ffprobe exited with a failure status
    #[error("ffprobe failed: {0}")]
    ProbeFailed(String),

    /// Error when the probe output could not be parsed
    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    /// Error when the input has no usable duration
    #[error("input has zero or unknown duration: {0}")]
    ZeroDuration(String),
}

/// Errors that can occur during speech recognition
#[derive(Error, Debug)]
pub enum RecognizerError {
    /// Error when the recognizer process could not be started
    #[error("failed to invoke recognizer: {0}")]
    InvocationFailed(String),

    /// Error when the recognizer exited with a failure status
    #[error("recognizer failed: {0}")]
    EngineFailed(String),

    /// Error when the recognizer output could not be parsed
    #[error("failed to parse recognizer output: {0}")]
    ParseError(String),

    /// Error with the recognizer configuration (model directory, backend)
    #[error("recognizer configuration error: {0}")]
    ConfigError(String),
}

/// Errors that can occur while rendering video
#[derive(Error, Debug)]
pub enum RenderError {
    /// Error when the ffmpeg process could not be started
    #[error("failed to invoke ffmpeg: {0}")]
    InvocationFailed(String),

    /// Error when ffmpeg exited with a failure status
    #[error("ffmpeg failed: {0}")]
    EncodeFailed(String),

    /// Error when an ffmpeg invocation exceeded its time budget
    #[error("ffmpeg timed out after {0} seconds")]
    Timeout(u64),
}
