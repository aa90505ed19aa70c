use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::app_config::Config;
use crate::file_utils::{self, FileManager, StagingDirs};
use crate::media_probe::VideoAsset;
use crate::recognizer::{self, Recognizer};
use crate::renderer::{partial_path, Renderer};
use crate::segmenter::{plan_segments, Segment};
use crate::subtitle_builder::{
    group_words, offset_cues, render_ass_document, render_srt_document, renumber, AssStyle,
    CuePolicy, SubtitleCue,
};

// @module: Pipeline driver sequencing probe, segmentation, recognition,
// cue building, rendering, and concatenation

/// Result of one segment's pipeline pass
struct SegmentOutcome {
    /// Segment index; the concatenation order
    index: usize,

    /// Rendered vertical clip awaiting concatenation
    rendered_path: PathBuf,

    /// Timeline-relative cues recognized in this segment
    cues: Vec<SubtitleCue>,
}

/// Main application controller for the vertical-clip pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Run the main workflow with an input video file and output directory.
    ///
    /// Ctrl-C aborts in-flight external processes (they are spawned with
    /// kill-on-drop) and removes partial output before returning an error.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        force_overwrite: bool,
    ) -> Result<()> {
        let final_path = output_dir.join(FileManager::final_output_name(&input_file));

        tokio::select! {
            result = self.run_pipeline(&input_file, &output_dir, force_overwrite) => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, cleaning up partial output");
                cleanup_partial_output(&output_dir, &final_path);
                Err(anyhow::anyhow!("Run cancelled by user"))
            }
        }
    }

    /// Run the workflow in folder mode, processing all video files found in
    /// a directory. Each video gets its own staging subdirectory.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        if !input_dir.exists() {
            return Err(anyhow::anyhow!(
                "Input directory does not exist: {:?}",
                input_dir
            ));
        }

        let video_files = FileManager::list_videos(&input_dir)?;

        if video_files.is_empty() {
            return Err(anyhow::anyhow!(
                "No video files found in directory: {:?}",
                input_dir
            ));
        }

        let mut success_count = 0;
        let mut error_count = 0;

        for video_file in &video_files {
            let file_name = video_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let stem = video_file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "output".to_string());
            let output_dir = input_dir.join(format!("{}_vertisub", stem));

            info!("Processing video: {:?}", video_file);
            match self
                .run(video_file.clone(), output_dir, force_overwrite)
                .await
            {
                Ok(_) => success_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }
        }

        info!(
            "Folder processing completed: {} processed, {} errors",
            success_count, error_count
        );

        if error_count > 0 {
            return Err(anyhow::anyhow!(
                "{} of {} files failed",
                error_count,
                video_files.len()
            ));
        }

        Ok(())
    }

    /// The actual pipeline body; cancellation is handled by the caller
    async fn run_pipeline(
        &self,
        input_file: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow::anyhow!(
                "Input file does not exist: {:?}",
                input_file
            ));
        }

        // Skip if the final artifact already exists and no force flag
        let final_path = output_dir.join(FileManager::final_output_name(input_file));
        if final_path.exists() && !force_overwrite {
            warn!("Skipping file, output already exists (use -f to force overwrite)");
            return Ok(());
        }

        // Probe before creating anything: a corrupt or zero-duration input
        // must not leave partial writes in the output directory
        let asset = VideoAsset::probe(input_file)
            .await
            .context("Probe stage failed")?;

        info!(
            "Input: {:?} ({:.2}s, {}x{} @ {:.2} fps)",
            asset.path,
            asset.duration_ms as f64 / 1000.0,
            asset.width,
            asset.height,
            asset.fps
        );

        FileManager::ensure_dir(output_dir)?;
        let staging = FileManager::ensure_staging_dirs(output_dir)?;

        let segment_ms = self.config.pipeline.segment_seconds * 1000;
        let segments = plan_segments(asset.duration_ms, segment_ms)
            .context("Segmentation stage failed")?;
        info!(
            "Duration: {:.2}s => segments: {}",
            asset.duration_ms as f64 / 1000.0,
            segments.len()
        );

        let recognizer: Arc<Box<dyn Recognizer>> = Arc::new(
            recognizer::create_recognizer(&self.config.recognizer)
                .context("Recognizer configuration failed")?,
        );
        info!(
            "Recognizer: {} (model: {})",
            self.config.recognizer.backend.display_name(),
            self.config.recognizer.model_dir.display()
        );

        let renderer = Arc::new(Renderer::new(
            self.config.render.clone(),
            self.config.subtitle.font_path.parent().map(Path::to_path_buf),
            self.config.pipeline.tool_timeout_secs,
        ));
        let policy = CuePolicy::from(&self.config.subtitle);
        let style = AssStyle::from_config(&self.config);

        // Progress over segments
        let multi_progress = MultiProgress::new();
        let progress_bar = multi_progress.add(ProgressBar::new(segments.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Processing segments");

        // Per-segment work is independent; bound it with a semaphore so at
        // most `concurrency` encoder processes run at once
        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.concurrency));

        let results = stream::iter(segments.iter().copied())
            .map(|segment| {
                let recognizer = Arc::clone(&recognizer);
                let renderer = Arc::clone(&renderer);
                let semaphore = Arc::clone(&semaphore);
                let policy = policy.clone();
                let style = style.clone();
                let staging = staging.clone();
                let input_file = input_file.to_path_buf();
                let sample_rate = self.config.recognizer.sample_rate;
                let burn_subs = self.config.render.burn_subs;
                let pb = progress_bar.clone();

                async move {
                    let _permit = semaphore.acquire().await.expect("semaphore closed");

                    let result = process_segment(
                        &input_file,
                        segment,
                        &staging,
                        recognizer.as_ref().as_ref(),
                        &renderer,
                        &policy,
                        &style,
                        sample_rate,
                        burn_subs,
                    )
                    .await;

                    pb.inc(1);
                    (segment.index, result)
                }
            })
            .buffer_unordered(self.config.pipeline.concurrency)
            .collect::<Vec<_>>()
            .await;

        progress_bar.finish_and_clear();

        // Re-establish segment order; completion order is meaningless
        let mut sorted_results = results;
        sorted_results.sort_by_key(|(index, _)| *index);

        let mut outcomes = Vec::with_capacity(sorted_results.len());
        for (index, result) in sorted_results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    cleanup_partial_output(output_dir, &final_path);
                    return Err(e).context(format!("Render stage failed for segment {}", index));
                }
            }
        }

        // Merge cues onto the full timeline and write the sidecars
        let mut all_cues: Vec<SubtitleCue> = outcomes
            .iter()
            .flat_map(|o| o.cues.iter().cloned())
            .collect();
        all_cues.sort_by_key(|cue| cue.start_ms);
        renumber(&mut all_cues);

        let stem = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let srt_path = staging.subs.join(format!("{}.srt", stem));
        FileManager::write_to_file(&srt_path, &render_srt_document(&all_cues))?;
        let ass_path = staging.subs.join(format!("{}.ass", stem));
        FileManager::write_to_file(&ass_path, &render_ass_document(&all_cues, &style))?;

        // Concatenate in segment order
        let rendered: Vec<PathBuf> = outcomes.iter().map(|o| o.rendered_path.clone()).collect();
        let manifest_path = staging.finals.join("concat.txt");
        renderer
            .concat_segments(&rendered, &manifest_path, &final_path)
            .await
            .context("Concatenation stage failed")?;

        let elapsed = start_time.elapsed();
        info!(
            "Done in {}. Final video: {} ({} cues)",
            Self::format_duration(elapsed),
            final_path.display(),
            all_cues.len()
        );
        info!("Subtitle sidecars: {}", staging.subs.display());

        Ok(())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Remove artifacts a failed or cancelled run must not leave behind: the
/// partial final file and all four staging directories.
pub fn cleanup_partial_output(output_dir: &Path, final_path: &Path) {
    let part = partial_path(final_path);
    if let Err(e) = FileManager::remove_if_exists(&part) {
        warn!("Failed to remove partial output {:?}: {}", part, e);
    }
    for dir in [
        file_utils::SEGMENTS_DIR,
        file_utils::WAV_DIR,
        file_utils::SUBS_DIR,
        file_utils::FINAL_DIR,
    ] {
        if let Err(e) = FileManager::remove_dir_if_exists(output_dir.join(dir)) {
            warn!("Failed to remove staging directory {}: {}", dir, e);
        }
    }
}

/// Run the per-segment pipeline: extract clip, extract audio, recognize,
/// build cues, render.
///
/// Recognition failure degrades to an empty cue list for the segment; the
/// segment still renders with its video and audio content intact.
#[allow(clippy::too_many_arguments)]
async fn process_segment(
    input_file: &Path,
    segment: Segment,
    staging: &StagingDirs,
    recognizer: &dyn Recognizer,
    renderer: &Renderer,
    policy: &CuePolicy,
    style: &AssStyle,
    sample_rate: u32,
    burn_subs: bool,
) -> Result<SegmentOutcome> {
    let stem = segment.clip_stem();
    let clip_path = staging.segments.join(format!("{}.mp4", stem));
    let wav_path = staging.wav.join(format!("{}.wav", stem));
    let ass_path = staging.subs.join(format!("{}.ass", stem));
    let rendered_path = if burn_subs {
        staging.finals.join(format!("{}_sub.mp4", stem))
    } else {
        staging.finals.join(format!("{}.mp4", stem))
    };

    debug!(
        "[segment {}] {}ms-{}ms",
        segment.index, segment.start_ms, segment.end_ms
    );

    renderer
        .extract_segment(input_file, segment.start_ms, segment.duration_ms(), &clip_path)
        .await
        .with_context(|| format!("Failed to extract segment {}", segment.index))?;

    renderer
        .extract_wav(&clip_path, sample_rate, &wav_path)
        .await
        .with_context(|| format!("Failed to extract audio for segment {}", segment.index))?;

    // Partial-failure tolerance at segment granularity: degraded subtitles,
    // never an aborted run
    let spans = match recognizer.recognize(&wav_path).await {
        Ok(spans) => spans,
        Err(e) => {
            warn!(
                "Recognition failed for segment {}, continuing with empty subtitles: {}",
                segment.index, e
            );
            Vec::new()
        }
    };

    let segment_cues = group_words(&spans, segment.duration_ms(), policy);
    FileManager::write_to_file(&ass_path, &render_ass_document(&segment_cues, style))?;

    renderer
        .render_segment(&clip_path, &ass_path, &rendered_path)
        .await
        .with_context(|| format!("Failed to render segment {}", segment.index))?;

    let cues = offset_cues(&segment_cues, segment.start_ms);

    Ok(SegmentOutcome {
        index: segment.index,
        rendered_path,
        cues,
    })
}
