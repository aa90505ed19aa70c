use std::path::{Path, PathBuf};
use log::{error, debug};
use serde_json::{Value, from_str};
use tokio::process::Command;

use crate::errors::ProbeError;
use crate::renderer::filter_tool_stderr;

// @module: Media probing via ffprobe

/// Metadata of a source video file, immutable for the duration of one run
#[derive(Debug, Clone)]
pub struct VideoAsset {
    /// Path to the media file
    pub path: PathBuf,

    /// Total duration in milliseconds
    pub duration_ms: u64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Frames per second
    pub fps: f64,
}

impl VideoAsset {
    /// Probe a video file with ffprobe and build an asset from its metadata.
    ///
    /// Fails if the file is missing, unreadable, or has zero duration; all
    /// of these are fatal for the run.
    pub async fn probe<P: AsRef<Path>>(path: P) -> Result<Self, ProbeError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ProbeError::InvocationFailed(format!(
                "video file not found: {:?}",
                path
            )));
        }

        // Add timeout to prevent hanging on problematic files
        let ffprobe_future = Command::new("ffprobe")
            .args([
                "-v", "error",
                "-print_format", "json",
                "-show_format",
                "-show_streams",
                "-select_streams", "v:0",
                path.to_str().unwrap_or(""),
            ])
            .kill_on_drop(true)
            .output();

        let timeout_duration = std::time::Duration::from_secs(60);
        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| ProbeError::InvocationFailed(e.to_string()))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(ProbeError::ProbeFailed(
                    "ffprobe timed out after 60 seconds".to_string(),
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let filtered = filter_tool_stderr(&stderr);
            error!("ffprobe failed: {}", filtered);
            return Err(ProbeError::ProbeFailed(filtered));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: Value = from_str(&stdout)
            .map_err(|e| ProbeError::ParseError(e.to_string()))?;

        Self::from_probe_json(path, &json)
    }

    /// Build an asset from parsed ffprobe JSON. Split out for testability.
    pub fn from_probe_json(path: &Path, json: &Value) -> Result<Self, ProbeError> {
        let duration_secs: f64 = json
            .get("format")
            .and_then(|f| f.get("duration"))
            .and_then(|d| d.as_str())
            .and_then(|d| d.parse().ok())
            .ok_or_else(|| {
                ProbeError::ParseError("no duration in ffprobe output".to_string())
            })?;

        let duration_ms = (duration_secs * 1000.0).round() as u64;
        if duration_ms == 0 {
            return Err(ProbeError::ZeroDuration(format!("{:?}", path)));
        }

        let stream = json
            .get("streams")
            .and_then(|s| s.as_array())
            .and_then(|s| s.first())
            .ok_or_else(|| {
                ProbeError::ParseError("no video stream in ffprobe output".to_string())
            })?;

        let width = stream
            .get("width")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;
        let height = stream
            .get("height")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;

        let fps = stream
            .get("r_frame_rate")
            .and_then(|v| v.as_str())
            .map(parse_frame_rate)
            .unwrap_or(0.0);

        debug!(
            "Probed {:?}: {}ms, {}x{} @ {:.3} fps",
            path, duration_ms, width, height, fps
        );

        Ok(VideoAsset {
            path: path.to_path_buf(),
            duration_ms,
            width,
            height,
            fps,
        })
    }
}

/// Parse an ffprobe rational frame rate ("30000/1001" or "25/1")
pub fn parse_frame_rate(rate: &str) -> f64 {
    let mut parts = rate.splitn(2, '/');
    let num: f64 = parts
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0.0);
    let den: f64 = parts
        .next()
        .and_then(|d| d.parse().ok())
        .unwrap_or(1.0);
    if den == 0.0 { 0.0 } else { num / den }
}
