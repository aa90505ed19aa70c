/*!
 * Tests for cue building and serialization
 */

use vertisub::recognizer::WordSpan;
use vertisub::segmenter::plan_segments;
use vertisub::subtitle_builder::{
    build_timeline_cues, group_words, offset_cues, render_ass_document, render_srt_document,
    renumber, AssStyle, CuePolicy, SubtitleCue,
};

use crate::common;

fn test_policy() -> CuePolicy {
    CuePolicy {
        max_line_chars: 60,
        max_gap_ms: 800,
        min_cue_ms: 300,
        max_cue_ms: 7000,
    }
}

fn test_style() -> AssStyle {
    AssStyle {
        play_res_x: 1080,
        play_res_y: 1920,
        font_name: "Oswald-Bold".to_string(),
        font_size: 100,
        pos_y: 1500,
        fade_in_ms: 200,
        fade_out_ms: 200,
    }
}

/// Words separated by less than the gap threshold merge into one cue
#[test]
fn test_group_words_withSmallGaps_shouldMergeIntoOneCue() {
    let spans = vec![
        WordSpan { text: "hello".into(), start_ms: 100, end_ms: 500, confidence: None },
        WordSpan { text: "there".into(), start_ms: 600, end_ms: 1000, confidence: None },
    ];
    let cues = group_words(&spans, 60_000, &test_policy());

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text, "hello there");
    assert_eq!(cues[0].start_ms, 100);
    assert_eq!(cues[0].end_ms, 1000);
}

/// A gap above the threshold starts a new cue
#[test]
fn test_group_words_withLargeGap_shouldSplitCues() {
    let cues = group_words(&common::sample_spans(), 60_000, &test_policy());

    // 1400ms of silence between "brown" and "fox" exceeds the 800ms gap
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "the quick brown");
    assert_eq!(cues[1].text, "fox jumps");
}

/// Exceeding the character budget starts a new cue even without a gap
#[test]
fn test_group_words_withLongText_shouldRespectLineBudget() {
    let policy = CuePolicy { max_line_chars: 11, ..test_policy() };
    let spans = vec![
        WordSpan { text: "aaaaa".into(), start_ms: 0, end_ms: 300, confidence: None },
        WordSpan { text: "bbbbb".into(), start_ms: 350, end_ms: 600, confidence: None },
        WordSpan { text: "ccccc".into(), start_ms: 650, end_ms: 900, confidence: None },
    ];
    let cues = group_words(&spans, 60_000, &policy);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "aaaaa bbbbb");
    assert_eq!(cues[1].text, "ccccc");
}

/// Spans are clamped to the owning segment's range
#[test]
fn test_group_words_withSpansBeyondSegment_shouldClamp() {
    let spans = vec![
        WordSpan { text: "inside".into(), start_ms: 500, end_ms: 1_200, confidence: None },
        // Ends past the segment boundary
        WordSpan { text: "edge".into(), start_ms: 1_500, end_ms: 2_500, confidence: None },
        // Starts past the segment boundary, dropped entirely
        WordSpan { text: "outside".into(), start_ms: 2_100, end_ms: 2_600, confidence: None },
    ];
    let cues = group_words(&spans, 2_000, &test_policy());

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text, "inside edge");
    assert!(cues[0].end_ms <= 2_000);
}

/// Cue durations honor the configured floor without overlapping the next cue
#[test]
fn test_group_words_withShortCue_shouldApplyDurationFloor() {
    let policy = CuePolicy { min_cue_ms: 1_000, ..test_policy() };
    let spans = vec![
        WordSpan { text: "blip".into(), start_ms: 100, end_ms: 200, confidence: None },
        WordSpan { text: "later".into(), start_ms: 5_000, end_ms: 5_100, confidence: None },
    ];
    let cues = group_words(&spans, 60_000, &policy);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].end_ms, 1_100);
    // Floor never creates overlap
    assert!(cues[0].end_ms <= cues[1].start_ms);
}

/// Cue durations honor the configured ceiling
#[test]
fn test_group_words_withLongCue_shouldApplyDurationCeiling() {
    let policy = CuePolicy { max_gap_ms: 60_000, max_cue_ms: 2_000, ..test_policy() };
    let spans = vec![
        WordSpan { text: "slow".into(), start_ms: 0, end_ms: 500, confidence: None },
        WordSpan { text: "drawl".into(), start_ms: 1_000, end_ms: 9_000, confidence: None },
    ];
    let cues = group_words(&spans, 60_000, &policy);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].end_ms, 2_000);
}

/// A character-budget split under overlapping word timings never produces
/// overlapping cues
#[test]
fn test_group_words_withOverlappingWords_shouldNotOverlapOnSplit() {
    let policy = CuePolicy { max_line_chars: 5, ..test_policy() };
    let spans = vec![
        WordSpan { text: "aaaaa".into(), start_ms: 0, end_ms: 2_000, confidence: None },
        WordSpan { text: "bbbbb".into(), start_ms: 1_000, end_ms: 3_000, confidence: None },
    ];
    let cues = group_words(&spans, 60_000, &policy);

    assert_eq!(cues.len(), 2);
    // The outgoing cue is trimmed to the split point
    assert_eq!(cues[0].end_ms, 1_000);
    assert_eq!(cues[1].start_ms, 1_000);
    for pair in cues.windows(2) {
        assert!(pair[0].end_ms <= pair[1].start_ms, "cues overlap");
    }
    for cue in &cues {
        assert!(cue.end_ms > cue.start_ms);
    }
}

/// A word whose window sits entirely inside the current cue keeps its text
/// instead of creating a zero-length cue
#[test]
fn test_group_words_withFullyCoveredWord_shouldKeepItsText() {
    let policy = CuePolicy { max_line_chars: 5, ..test_policy() };
    let spans = vec![
        WordSpan { text: "aaaaa".into(), start_ms: 0, end_ms: 2_000, confidence: None },
        WordSpan { text: "bbbbb".into(), start_ms: 0, end_ms: 1_500, confidence: None },
    ];
    let cues = group_words(&spans, 60_000, &policy);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text, "aaaaa bbbbb");
    assert_eq!(cues[0].end_ms, 2_000);
}

/// Empty span input produces no cues
#[test]
fn test_group_words_withNoSpans_shouldProduceNoCues() {
    let cues = group_words(&[], 60_000, &test_policy());
    assert!(cues.is_empty());
}

/// Markup-significant characters never reach the subtitle documents
#[test]
fn test_group_words_withUnsafeCharacters_shouldSanitizeText() {
    let spans = vec![
        WordSpan { text: "he{llo}".into(), start_ms: 0, end_ms: 400, confidence: None },
        WordSpan { text: "wor\nld".into(), start_ms: 450, end_ms: 900, confidence: None },
        // A word that is nothing but markup disappears entirely
        WordSpan { text: "{}".into(), start_ms: 5_000, end_ms: 5_400, confidence: None },
    ];
    let cues = group_words(&spans, 60_000, &test_policy());

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text, "he llo wor ld");
}

/// Offsetting shifts every timestamp by the segment start
#[test]
fn test_offset_cues_withSegmentStart_shouldShiftTimestamps() {
    let cues = group_words(&common::sample_spans(), 60_000, &test_policy());
    let shifted = offset_cues(&cues, 120_000);

    for (original, moved) in cues.iter().zip(shifted.iter()) {
        assert_eq!(moved.start_ms, original.start_ms + 120_000);
        assert_eq!(moved.end_ms, original.end_ms + 120_000);
        assert_eq!(moved.text, original.text);
    }
}

/// Timeline cues stay monotonically non-decreasing across segment boundaries
#[test]
fn test_build_timeline_cues_acrossSegments_shouldStayMonotonic() {
    let segments = plan_segments(180_000, 60_000).unwrap();
    let policy = test_policy();

    let mut all_cues: Vec<SubtitleCue> = Vec::new();
    for segment in &segments {
        all_cues.extend(build_timeline_cues(&common::sample_spans(), segment, &policy));
    }
    renumber(&mut all_cues);

    for pair in all_cues.windows(2) {
        assert!(pair[0].start_ms <= pair[1].start_ms, "cue order regressed");
        assert!(pair[0].end_ms <= pair[1].start_ms, "cues overlap");
    }
    for (i, cue) in all_cues.iter().enumerate() {
        assert_eq!(cue.seq_num, i + 1);
        assert!(cue.end_ms > cue.start_ms);
    }
}

/// Identical spans and policy always yield identical cue sequences
#[test]
fn test_group_words_withSameInput_shouldBeDeterministic() {
    let first = group_words(&common::sample_spans(), 60_000, &test_policy());
    let second = group_words(&common::sample_spans(), 60_000, &test_policy());
    assert_eq!(first, second);
}

/// SRT timestamps use the HH:MM:SS,mmm format
#[test]
fn test_format_srt_timestamp_withKnownValue_shouldFormatCorrectly() {
    assert_eq!(SubtitleCue::format_srt_timestamp(0), "00:00:00,000");
    assert_eq!(SubtitleCue::format_srt_timestamp(5_025_678), "01:23:45,678");
}

/// ASS timestamps use the H:MM:SS.cc format with centisecond rounding
#[test]
fn test_format_ass_timestamp_withKnownValue_shouldFormatCorrectly() {
    assert_eq!(SubtitleCue::format_ass_timestamp(0), "0:00:00.00");
    assert_eq!(SubtitleCue::format_ass_timestamp(61_230), "0:01:01.23");
    assert_eq!(SubtitleCue::format_ass_timestamp(3_661_005), "1:01:01.01");
}

/// The ASS document carries the configured style and per-line overrides
#[test]
fn test_render_ass_document_withCues_shouldCarryStyleAndOverrides() {
    let cues = group_words(&common::sample_spans(), 60_000, &test_policy());
    let doc = render_ass_document(&cues, &test_style());

    assert!(doc.contains("PlayResX: 1080"));
    assert!(doc.contains("PlayResY: 1920"));
    assert!(doc.contains("Style: Default,Oswald-Bold,100,"));
    assert!(doc.contains("{\\pos(540,1500)\\fad(200,200)}the quick brown"));
    assert_eq!(doc.matches("Dialogue:").count(), cues.len());
}

/// An empty cue list still renders a valid header-only ASS document
#[test]
fn test_render_ass_document_withNoCues_shouldRenderHeaderOnly() {
    let doc = render_ass_document(&[], &test_style());

    assert!(doc.contains("[Script Info]"));
    assert!(doc.contains("[Events]"));
    assert!(!doc.contains("Dialogue:"));
}

/// The SRT document lists every cue with sequence numbers and arrows
#[test]
fn test_render_srt_document_withCues_shouldListEntries() {
    let mut cues = group_words(&common::sample_spans(), 60_000, &test_policy());
    renumber(&mut cues);
    let doc = render_srt_document(&cues);

    assert!(doc.starts_with("1\n"));
    assert!(doc.contains(" --> "));
    assert!(doc.contains("the quick brown"));
    assert_eq!(doc.matches(" --> ").count(), cues.len());
}
