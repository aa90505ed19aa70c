use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::{Config, SubtitleConfig};
use crate::recognizer::WordSpan;
use crate::segmenter::Segment;

// @module: Subtitle cue building and serialization

/// Characters that would open an ASS override block or break a dialogue line
static UNSAFE_TEXT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[{}\\\r\n\t]+").unwrap()
});

/// Strip markup-significant characters from recognized text
fn sanitize_text(text: &str) -> String {
    UNSAFE_TEXT_PATTERN.replace_all(text, " ").trim().to_string()
}

/// A single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Display text
    pub text: String,
}

impl SubtitleCue {
    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_srt_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Format a timestamp in milliseconds to ASS format (H:MM:SS.cc)
    pub fn format_ass_timestamp(ms: u64) -> String {
        let centis = (ms + 5) / 10; // round to centiseconds
        let hours = centis / 360_000;
        let minutes = (centis % 360_000) / 6_000;
        let seconds = (centis % 6_000) / 100;
        let centi = centis % 100;

        format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centi)
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_srt_timestamp(self.start_ms),
            Self::format_srt_timestamp(self.end_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Cue grouping policy derived from the subtitle configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CuePolicy {
    /// Maximum characters merged into one cue line
    pub max_line_chars: usize,

    /// Maximum silence between words merged into the same cue, in ms
    pub max_gap_ms: u64,

    /// Minimum display duration of a cue, in ms
    pub min_cue_ms: u64,

    /// Maximum display duration of a cue, in ms
    pub max_cue_ms: u64,
}

impl From<&SubtitleConfig> for CuePolicy {
    fn from(config: &SubtitleConfig) -> Self {
        Self {
            max_line_chars: config.max_line_chars,
            max_gap_ms: config.max_gap_ms,
            min_cue_ms: config.min_cue_ms,
            max_cue_ms: config.max_cue_ms,
        }
    }
}

/// Group recognized words into segment-relative subtitle cues.
///
/// Words are merged greedily: a word joins the current cue unless the gap
/// since the previous word exceeds `max_gap_ms` or the merged text would
/// exceed `max_line_chars`. Word text is sanitized of characters that would
/// corrupt the subtitle documents. Spans are clamped to [0, segment_duration_ms)
/// and cue durations to [min_cue_ms, max_cue_ms], never creating overlap
/// with the following cue. Deterministic for identical inputs and policy.
pub fn group_words(
    spans: &[WordSpan],
    segment_duration_ms: u64,
    policy: &CuePolicy,
) -> Vec<SubtitleCue> {
    // Clamp to the owning segment's range, dropping degenerate leftovers
    let clamped: Vec<WordSpan> = spans
        .iter()
        .filter(|w| w.start_ms < segment_duration_ms)
        .map(|w| WordSpan {
            text: sanitize_text(&w.text),
            start_ms: w.start_ms,
            end_ms: w.end_ms.min(segment_duration_ms),
            confidence: w.confidence,
        })
        .filter(|w| w.end_ms > w.start_ms && !w.text.is_empty())
        .collect();

    if clamped.is_empty() {
        return Vec::new();
    }

    let mut cues: Vec<SubtitleCue> = Vec::new();
    let mut current = SubtitleCue {
        seq_num: 1,
        start_ms: clamped[0].start_ms,
        end_ms: clamped[0].end_ms,
        text: clamped[0].text.clone(),
    };

    for word in &clamped[1..] {
        let gap = word.start_ms.saturating_sub(current.end_ms);
        let merged_len = current.text.chars().count() + 1 + word.text.chars().count();

        if gap > policy.max_gap_ms || merged_len > policy.max_line_chars {
            // Overlapping word timings must not leak into overlapping cues:
            // trim the outgoing cue to the split point, or push the new cue
            // forward when trimming would leave a zero-length cue behind
            let mut start_ms = word.start_ms;
            if start_ms < current.end_ms {
                if start_ms > current.start_ms {
                    current.end_ms = start_ms;
                } else {
                    start_ms = current.end_ms;
                }
            }
            if start_ms >= word.end_ms {
                // The word's window is fully inside the current cue; keep
                // its text rather than dropping recognized speech
                current.text.push(' ');
                current.text.push_str(&word.text);
                continue;
            }
            cues.push(current);
            current = SubtitleCue {
                seq_num: cues.len() + 1,
                start_ms,
                end_ms: word.end_ms,
                text: word.text.clone(),
            };
        } else {
            current.text.push(' ');
            current.text.push_str(&word.text);
            current.end_ms = current.end_ms.max(word.end_ms);
        }
    }
    cues.push(current);

    apply_duration_bounds(&mut cues, segment_duration_ms, policy);

    cues
}

/// Clamp cue durations to the policy floor/ceiling without introducing
/// overlap or leaving the segment window.
fn apply_duration_bounds(cues: &mut [SubtitleCue], segment_duration_ms: u64, policy: &CuePolicy) {
    let count = cues.len();
    for i in 0..count {
        // Ceiling first
        let max_end = cues[i].start_ms + policy.max_cue_ms;
        if cues[i].end_ms > max_end {
            cues[i].end_ms = max_end;
        }

        // Floor, bounded by the next cue's start and the segment end
        let min_end = cues[i].start_ms + policy.min_cue_ms;
        if cues[i].end_ms < min_end {
            let mut limit = segment_duration_ms;
            if i + 1 < count {
                limit = limit.min(cues[i + 1].start_ms);
            }
            cues[i].end_ms = min_end.min(limit).max(cues[i].end_ms);
        }
    }
}

/// Shift segment-relative cues onto the full video timeline
pub fn offset_cues(cues: &[SubtitleCue], offset_ms: u64) -> Vec<SubtitleCue> {
    cues.iter()
        .map(|c| SubtitleCue {
            seq_num: c.seq_num,
            start_ms: c.start_ms + offset_ms,
            end_ms: c.end_ms + offset_ms,
            text: c.text.clone(),
        })
        .collect()
}

/// Build the full-timeline cue list for a segment's recognized words
pub fn build_timeline_cues(
    spans: &[WordSpan],
    segment: &Segment,
    policy: &CuePolicy,
) -> Vec<SubtitleCue> {
    let segment_cues = group_words(spans, segment.duration_ms(), policy);
    offset_cues(&segment_cues, segment.start_ms)
}

/// Renumber cues sequentially after merging segment results
pub fn renumber(cues: &mut [SubtitleCue]) {
    for (i, cue) in cues.iter_mut().enumerate() {
        cue.seq_num = i + 1;
    }
}

/// Styling parameters for the generated ASS document
#[derive(Debug, Clone)]
pub struct AssStyle {
    /// Play resolution width
    pub play_res_x: u32,
    /// Play resolution height
    pub play_res_y: u32,
    /// Font name used in the style line
    pub font_name: String,
    /// Font size in play-resolution pixels
    pub font_size: u32,
    /// Vertical pixel offset of the subtitle line
    pub pos_y: u32,
    /// Fade-in duration in ms
    pub fade_in_ms: u32,
    /// Fade-out duration in ms
    pub fade_out_ms: u32,
}

impl AssStyle {
    /// Build the ASS style from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            play_res_x: config.render.target_width,
            play_res_y: config.render.target_height,
            font_name: config.font_name(),
            font_size: config.subtitle.font_size,
            pos_y: config.subtitle.pos_y,
            fade_in_ms: config.subtitle.fade_in_ms,
            fade_out_ms: config.subtitle.fade_out_ms,
        }
    }
}

/// Render cues into a complete ASS document.
///
/// An empty cue list still produces a valid document with a header and no
/// dialogue events, so a silent segment renders normally.
pub fn render_ass_document(cues: &[SubtitleCue], style: &AssStyle) -> String {
    let mut doc = format!(
        "[Script Info]\n\
         Title: Auto-generated subtitles\n\
         ScriptType: v4.00+\n\
         PlayResX: {}\n\
         PlayResY: {}\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,{},{},&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,5,0,0,0,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        style.play_res_x, style.play_res_y, style.font_name, style.font_size
    );

    let center_x = style.play_res_x / 2;
    for cue in cues {
        let start = SubtitleCue::format_ass_timestamp(cue.start_ms);
        let end = SubtitleCue::format_ass_timestamp(cue.end_ms);
        doc.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{{\\pos({},{})\\fad({},{})}}{}\n",
            start, end, center_x, style.pos_y, style.fade_in_ms, style.fade_out_ms, cue.text
        ));
    }

    doc
}

/// Render the full-timeline cue list as an SRT document
pub fn render_srt_document(cues: &[SubtitleCue]) -> String {
    let mut doc = String::new();
    for cue in cues {
        doc.push_str(&cue.to_string());
    }
    doc
}
