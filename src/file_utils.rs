use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Names of the staging directories created under the output directory
pub const SEGMENTS_DIR: &str = "segments";
pub const WAV_DIR: &str = "wav";
pub const SUBS_DIR: &str = "subs";
pub const FINAL_DIR: &str = "final";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Create the staging layout (segments/, wav/, subs/, final/) under
    /// the output directory and return the four paths in that order.
    pub fn ensure_staging_dirs<P: AsRef<Path>>(output_dir: P) -> Result<StagingDirs> {
        let output_dir = output_dir.as_ref();
        let dirs = StagingDirs {
            segments: output_dir.join(SEGMENTS_DIR),
            wav: output_dir.join(WAV_DIR),
            subs: output_dir.join(SUBS_DIR),
            finals: output_dir.join(FINAL_DIR),
        };
        for dir in [&dirs.segments, &dirs.wav, &dirs.subs, &dirs.finals] {
            Self::ensure_dir(dir)?;
        }
        Ok(dirs)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(&normalized_ext[1..]) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// List video files directly inside a directory, sorted by path.
    ///
    /// Does not recurse: output trees from earlier runs live in
    /// subdirectories of the input directory and must not be rediscovered
    /// as fresh inputs.
    pub fn list_videos<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        for entry in WalkDir::new(dir.as_ref()).max_depth(1).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            if Self::is_video_file(entry.path()) {
                result.push(entry.path().to_path_buf());
            }
        }
        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Remove a file if it exists, ignoring a missing file
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove file: {:?}", path))?;
        }
        Ok(())
    }

    /// Remove a directory tree if it exists
    pub fn remove_dir_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_dir_all(path)
                .with_context(|| format!("Failed to remove directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Detect if a file looks like a video file supported by ffmpeg
    pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        if !path.is_file() {
            return false;
        }

        // Common video file extensions supported by ffmpeg
        // This list is not exhaustive but covers the most common formats
        let video_extensions = [
            "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
            "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
        ];

        path.extension()
            .map(|ext| {
                let ext_str = ext.to_string_lossy().to_lowercase();
                video_extensions.contains(&ext_str.as_str())
            })
            .unwrap_or(false)
    }

    /// Name of the final concatenated artifact for an input video
    pub fn final_output_name(input_file: &Path) -> String {
        let stem = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        format!("{}_vertical.mp4", stem)
    }
}

/// Staging directory layout for one pipeline run
#[derive(Debug, Clone)]
pub struct StagingDirs {
    /// Stream-copied segment clips
    pub segments: PathBuf,
    /// Per-segment 16kHz mono WAV files
    pub wav: PathBuf,
    /// Per-segment ASS files and the full-timeline sidecars
    pub subs: PathBuf,
    /// Rendered per-segment outputs awaiting concatenation
    pub finals: PathBuf,
}
