/*!
 * End-to-end cue pipeline tests driven by the mock recognizer.
 *
 * These cover the full path from segment planning through recognition to
 * the merged subtitle timeline, without touching ffmpeg.
 */

use std::path::Path;

use vertisub::recognizer::mock::{MockBehavior, MockRecognizer};
use vertisub::recognizer::Recognizer;
use vertisub::segmenter::plan_segments;
use vertisub::subtitle_builder::{
    build_timeline_cues, render_srt_document, renumber, CuePolicy, SubtitleCue,
};

fn pipeline_policy() -> CuePolicy {
    CuePolicy {
        max_line_chars: 60,
        max_gap_ms: 800,
        min_cue_ms: 300,
        max_cue_ms: 7000,
    }
}

/// Run the recognition-to-cue path for every planned segment
async fn collect_timeline(
    recognizer: &MockRecognizer,
    duration_ms: u64,
    segment_ms: u64,
) -> Vec<SubtitleCue> {
    let segments = plan_segments(duration_ms, segment_ms).unwrap();
    let policy = pipeline_policy();

    let mut timeline = Vec::new();
    for segment in &segments {
        let wav_name = format!("{}.wav", segment.clip_stem());
        match recognizer.recognize(Path::new(&wav_name)).await {
            Ok(spans) => timeline.extend(build_timeline_cues(&spans, segment, &policy)),
            // A failed segment degrades to no cues for that segment
            Err(_) => continue,
        }
    }
    timeline.sort_by_key(|c| c.start_ms);
    renumber(&mut timeline);
    timeline
}

/// The merged timeline is strictly ordered and renumbered from 1
#[tokio::test]
async fn test_pipeline_withWorkingRecognizer_shouldProduceOrderedTimeline() {
    let recognizer = MockRecognizer::working();
    let timeline = collect_timeline(&recognizer, 180_000, 60_000).await;

    // Every segment contributed, one recognition per segment
    assert_eq!(recognizer.calls(), 3);
    assert!(!timeline.is_empty());

    for (i, cue) in timeline.iter().enumerate() {
        assert_eq!(cue.seq_num, i + 1);
        assert!(cue.end_ms > cue.start_ms);
        assert!(!cue.text.is_empty());
    }
    for pair in timeline.windows(2) {
        assert!(pair[0].end_ms <= pair[1].start_ms, "cues overlap");
    }

    // Cue timestamps land inside their owning segment's range
    let last = timeline.last().unwrap();
    assert!(last.start_ms >= 120_000, "last segment produced no cues");
    assert!(last.end_ms <= 180_000);
}

/// Two identical runs yield byte-identical subtitle documents
#[tokio::test]
async fn test_pipeline_withSameInput_shouldBeDeterministic() {
    let first = collect_timeline(&MockRecognizer::working(), 223_000, 60_000).await;
    let second = collect_timeline(&MockRecognizer::working(), 223_000, 60_000).await;

    assert_eq!(first, second);
    assert_eq!(render_srt_document(&first), render_srt_document(&second));
}

/// Silent audio produces an empty timeline, not a failure
#[tokio::test]
async fn test_pipeline_withEmptyRecognizer_shouldProduceNoCues() {
    let recognizer = MockRecognizer::empty();
    let timeline = collect_timeline(&recognizer, 180_000, 60_000).await;

    // All segments were still attempted
    assert_eq!(recognizer.calls(), 3);
    assert!(timeline.is_empty());
}

/// A recognizer failing on some segments degrades those segments only
#[tokio::test]
async fn test_pipeline_withIntermittentRecognizer_shouldDegradeGracefully() {
    let recognizer = MockRecognizer::with_behavior(MockBehavior::Intermittent { fail_every: 2 });
    let timeline = collect_timeline(&recognizer, 240_000, 60_000).await;

    assert_eq!(recognizer.calls(), 4);

    // Segments 0 and 2 succeeded (calls 1 and 3), segments 1 and 3 failed
    let working_timeline = collect_timeline(&MockRecognizer::working(), 240_000, 60_000).await;
    assert_eq!(timeline.len(), working_timeline.len() / 2);

    // Surviving cues come from the successful segments only
    for cue in &timeline {
        let in_first = cue.start_ms < 60_000;
        let in_third = (120_000..180_000).contains(&cue.start_ms);
        assert!(in_first || in_third, "cue from a failed segment survived");
    }

    // Renumbering stays compact despite the gaps
    for (i, cue) in timeline.iter().enumerate() {
        assert_eq!(cue.seq_num, i + 1);
    }
}

/// A final segment shorter than the others still gets clamped cues
#[test]
fn test_pipeline_withShortTrailingSegment_shouldClampCues() {
    let timeline = tokio_test::block_on(async {
        let recognizer = MockRecognizer::working();
        // 61s total: second segment is only 1s long
        collect_timeline(&recognizer, 61_000, 60_000).await
    });

    for cue in &timeline {
        assert!(cue.end_ms <= 61_000, "cue exceeds the video duration");
    }
}
