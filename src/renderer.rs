/*!
 * Video rendering via ffmpeg.
 *
 * This module owns every ffmpeg invocation in the pipeline: segment
 * extraction (stream copy), audio extraction for the recognizer, the 9:16
 * reprojection with burned or soft subtitles, and final concatenation.
 * Argument construction is kept in pure functions so the command surface
 * is testable without an ffmpeg binary.
 */

use log::{debug, warn};
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::app_config::{RenderConfig, ScaleStrategy};
use crate::errors::RenderError;
use crate::file_utils::FileManager;

/// Filter ffmpeg/ffprobe stderr to only show meaningful error lines,
/// stripping the version banner, build configuration, and stream metadata
/// noise.
pub fn filter_tool_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Chapter",
        "    Chapter",
        "  Stream #",
        "      Metadata:",
        "        title",
        "        BPS",
        "        DURATION",
        "        NUMBER_OF",
        "        _STATISTICS",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            if line.trim().is_empty() {
                return false;
            }
            // Prefixes encode ffmpeg's indentation, match the raw line
            !dominated_prefixes.iter().any(|p| line.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

/// Format a millisecond timestamp as fractional seconds for ffmpeg
pub fn ms_to_secs_arg(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// Arguments for extracting one segment as a stream copy (no re-encode)
pub fn build_extract_segment_args(
    input: &Path,
    start_ms: u64,
    duration_ms: u64,
    output: &Path,
) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-y".to_string(),
        "-ss".to_string(),
        ms_to_secs_arg(start_ms),
        "-t".to_string(),
        ms_to_secs_arg(duration_ms),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-map".to_string(),
        "0".to_string(),
        "-c".to_string(),
        "copy".to_string(),
        "-reset_timestamps".to_string(),
        "1".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Arguments for extracting a segment's audio as mono PCM WAV for the
/// recognizer
pub fn build_extract_wav_args(input: &Path, sample_rate: u32, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-vn".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-ar".to_string(),
        sample_rate.to_string(),
        "-f".to_string(),
        "wav".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Video filter reprojecting the source frame onto the vertical target
pub fn build_scale_filter(strategy: ScaleStrategy, width: u32, height: u32) -> String {
    match strategy {
        ScaleStrategy::Pad => format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
            w = width,
            h = height
        ),
        ScaleStrategy::Crop => format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
            w = width,
            h = height
        ),
    }
}

/// Arguments for rendering one segment to the 9:16 target.
///
/// With `burn_subs` the ASS file is composited into the pixel stream via
/// the `ass` filter, with `fontsdir` pointing libass at the bundled font;
/// otherwise the ASS file is muxed as a selectable `mov_text` track. The
/// audio track is stream-copied unmodified in both modes.
pub fn build_render_segment_args(
    input: &Path,
    ass_path: &Path,
    fonts_dir: Option<&Path>,
    output: &Path,
    config: &RenderConfig,
) -> Vec<String> {
    let scale = build_scale_filter(
        config.scale_strategy,
        config.target_width,
        config.target_height,
    );

    let mut args = vec![
        "-hide_banner".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
    ];

    if config.burn_subs {
        let mut vf = format!("{},ass={}", scale, ass_path.to_string_lossy());
        if let Some(dir) = fonts_dir {
            vf.push_str(&format!(":fontsdir={}", dir.to_string_lossy()));
        }
        args.extend([
            "-vf".to_string(),
            vf,
            "-c:a".to_string(),
            "copy".to_string(),
        ]);
    } else {
        args.extend([
            "-i".to_string(),
            ass_path.to_string_lossy().to_string(),
            "-map".to_string(),
            "0:v".to_string(),
            "-map".to_string(),
            "0:a?".to_string(),
            "-map".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            scale,
            "-c:a".to_string(),
            "copy".to_string(),
            "-c:s".to_string(),
            "mov_text".to_string(),
        ]);
    }

    args.extend([
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        config.preset.clone(),
        "-crf".to_string(),
        config.crf.to_string(),
        output.to_string_lossy().to_string(),
    ]);

    args
}

/// Arguments for concatenating rendered segments via the concat demuxer
pub fn build_concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-y".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest.to_string_lossy().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        // The .part output name defeats extension-based muxer detection
        "-f".to_string(),
        "mp4".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Concat demuxer manifest content for the ordered segment outputs
pub fn build_concat_manifest(inputs: &[PathBuf]) -> String {
    let mut manifest = String::new();
    for input in inputs {
        // Single quotes inside paths must be escaped for the demuxer
        let escaped = input.to_string_lossy().replace('\'', "'\\''");
        manifest.push_str(&format!("file '{}'\n", escaped));
    }
    manifest
}

/// Renderer wrapping ffmpeg invocations with the configured policy
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderConfig,
    fonts_dir: Option<PathBuf>,
    timeout_secs: u64,
}

impl Renderer {
    /// Create a renderer from the render configuration. `fonts_dir` is the
    /// directory holding the subtitle font, handed to libass when burning.
    pub fn new(config: RenderConfig, fonts_dir: Option<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            config,
            fonts_dir,
            timeout_secs,
        }
    }

    /// Run ffmpeg with the given arguments, bounded by the configured
    /// timeout. Child processes are killed when the future is dropped, so
    /// cancellation never leaks an encoder.
    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), RenderError> {
        debug!("ffmpeg {}", args.join(" "));

        let ffmpeg_future = Command::new("ffmpeg")
            .args(args)
            .kill_on_drop(true)
            .output();

        let timeout_duration = std::time::Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| RenderError::InvocationFailed(e.to_string()))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(RenderError::Timeout(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::EncodeFailed(filter_tool_stderr(&stderr)));
        }

        Ok(())
    }

    /// Extract one segment from the source as a stream copy
    pub async fn extract_segment(
        &self,
        input: &Path,
        start_ms: u64,
        duration_ms: u64,
        output: &Path,
    ) -> Result<(), RenderError> {
        let args = build_extract_segment_args(input, start_ms, duration_ms, output);
        self.run_ffmpeg(&args).await
    }

    /// Extract a segment's audio track as mono PCM WAV
    pub async fn extract_wav(
        &self,
        input: &Path,
        sample_rate: u32,
        output: &Path,
    ) -> Result<(), RenderError> {
        let args = build_extract_wav_args(input, sample_rate, output);
        self.run_ffmpeg(&args).await
    }

    /// Render one segment to the vertical target, retrying once on failure
    /// when the policy allows it. A second failure is fatal for the run.
    pub async fn render_segment(
        &self,
        input: &Path,
        ass_path: &Path,
        output: &Path,
    ) -> Result<(), RenderError> {
        let args = build_render_segment_args(
            input,
            ass_path,
            self.fonts_dir.as_deref(),
            output,
            &self.config,
        );

        match self.run_ffmpeg(&args).await {
            Ok(()) => Ok(()),
            Err(first_error) => {
                if !self.config.retry_failed_segment {
                    return Err(first_error);
                }

                warn!(
                    "Segment render failed, retrying once: {}",
                    first_error
                );
                // A partial output from the failed attempt must not survive
                let _ = FileManager::remove_if_exists(output);

                self.run_ffmpeg(&args).await
            }
        }
    }

    /// Concatenate the ordered rendered segments into the final artifact.
    ///
    /// Writes to a `.part` sibling and renames into place only on success,
    /// so a failed or cancelled run never leaves a file under the final
    /// name.
    pub async fn concat_segments(
        &self,
        inputs: &[PathBuf],
        manifest_path: &Path,
        final_path: &Path,
    ) -> Result<(), RenderError> {
        let manifest = build_concat_manifest(inputs);
        FileManager::write_to_file(manifest_path, &manifest)
            .map_err(|e| RenderError::InvocationFailed(e.to_string()))?;

        let part_path = partial_path(final_path);
        let args = build_concat_args(manifest_path, &part_path);

        let result = self.run_ffmpeg(&args).await;
        if let Err(e) = result {
            let _ = FileManager::remove_if_exists(&part_path);
            return Err(e);
        }

        std::fs::rename(&part_path, final_path)
            .map_err(|e| RenderError::EncodeFailed(format!(
                "failed to move final output into place: {}",
                e
            )))?;

        Ok(())
    }
}

/// Temporary name used while the final artifact is being written
pub fn partial_path(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.mp4".to_string());
    name.push_str(".part");
    final_path.with_file_name(name)
}
