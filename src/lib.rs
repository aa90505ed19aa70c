/*!
 * # vertisub - Vertical clips with auto-generated subtitles
 *
 * A Rust library for cutting a video into fixed-length segments, running
 * speech recognition per segment, and rendering 9:16 vertical clips with
 * subtitles burned in or attached as a soft track.
 *
 * ## Features
 *
 * - Fixed-length segmentation covering the full source duration
 * - Per-segment speech recognition via an external Vosk engine
 * - Deterministic word-to-cue grouping with styling (font, position, fades)
 * - 9:16 reprojection (pad or crop) with the audio track preserved
 * - Burn-in or soft-subtitle output, final concatenation in segment order
 * - Bounded per-segment concurrency with an ordering barrier before concat
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `media_probe`: Source metadata via ffprobe
 * - `segmenter`: Fixed-length segment planning
 * - `recognizer`: Speech recognition backends:
 *   - `recognizer::vosk`: External Vosk recognizer adapter
 *   - `recognizer::mock`: Deterministic backend for tests
 * - `subtitle_builder`: Cue grouping and ASS/SRT serialization
 * - `renderer`: ffmpeg extraction, encoding, and concatenation
 * - `app_controller`: Pipeline driver
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod media_probe;
pub mod recognizer;
pub mod renderer;
pub mod segmenter;
pub mod subtitle_builder;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{ProbeError, RecognizerError, RenderError};
pub use media_probe::VideoAsset;
pub use recognizer::{Recognizer, WordSpan};
pub use segmenter::{plan_segments, Segment};
pub use subtitle_builder::{CuePolicy, SubtitleCue};
