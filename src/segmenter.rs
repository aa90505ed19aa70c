use anyhow::{anyhow, Result};

// @module: Fixed-length segment planning

/// A half-open time slice [start_ms, end_ms) of the source video.
///
/// Segments are contiguous, non-overlapping, and cover the full duration;
/// only the final segment may be shorter than the configured length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based position in the plan; also the concatenation order
    pub index: usize,

    /// Start of the slice in milliseconds
    pub start_ms: u64,

    /// End of the slice in milliseconds (exclusive)
    pub end_ms: u64,
}

impl Segment {
    /// Length of the slice in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    /// Clip file stem for this segment ("clip_00", "clip_01", ...)
    pub fn clip_stem(&self) -> String {
        format!("clip_{:02}", self.index)
    }
}

/// Plan an ordered sequence of segments covering [0, duration_ms).
///
/// Produces ceil(duration / segment_length) segments. The trailing partial
/// segment is kept, not discarded or padded.
pub fn plan_segments(duration_ms: u64, segment_ms: u64) -> Result<Vec<Segment>> {
    if duration_ms == 0 {
        return Err(anyhow!("Cannot segment a zero-duration video"));
    }
    if segment_ms == 0 {
        return Err(anyhow!("Segment length must be greater than zero"));
    }

    let count = duration_ms.div_ceil(segment_ms) as usize;
    let mut segments = Vec::with_capacity(count);

    for index in 0..count {
        let start_ms = index as u64 * segment_ms;
        let end_ms = (start_ms + segment_ms).min(duration_ms);
        segments.push(Segment {
            index,
            start_ms,
            end_ms,
        });
    }

    Ok(segments)
}
