/*!
 * Mock recognizer backend for testing.
 *
 * Provides deterministic behaviors:
 * - `MockRecognizer::working()` - returns a fixed word sequence
 * - `MockRecognizer::empty()` - recognizes nothing (silent segment)
 * - `MockRecognizer::failing()` - always fails with an engine error
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::RecognizerError;
use crate::recognizer::{Recognizer, WordSpan};

/// Behavior mode for the mock recognizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns a fixed sequence of word spans
    Working,
    /// Returns no spans (silent segment)
    Empty,
    /// Always fails with an engine error
    Failing,
    /// Fails on every Nth call, succeeds otherwise
    Intermittent { fail_every: usize },
}

/// Mock recognizer for testing pipeline behavior
#[derive(Debug)]
pub struct MockRecognizer {
    behavior: MockBehavior,
    call_count: AtomicUsize,
    spans: Vec<WordSpan>,
}

impl MockRecognizer {
    /// Mock that always returns the default word sequence
    pub fn working() -> Self {
        Self::with_behavior(MockBehavior::Working)
    }

    /// Mock that recognizes nothing
    pub fn empty() -> Self {
        Self::with_behavior(MockBehavior::Empty)
    }

    /// Mock that always fails
    pub fn failing() -> Self {
        Self::with_behavior(MockBehavior::Failing)
    }

    /// Mock with an explicit behavior
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: AtomicUsize::new(0),
            spans: default_spans(),
        }
    }

    /// Mock that returns the given spans on every call
    pub fn with_spans(spans: Vec<WordSpan>) -> Self {
        Self {
            behavior: MockBehavior::Working,
            call_count: AtomicUsize::new(0),
            spans,
        }
    }

    /// Number of recognize calls made so far
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

fn default_spans() -> Vec<WordSpan> {
    vec![
        WordSpan {
            text: "hello".to_string(),
            start_ms: 250,
            end_ms: 700,
            confidence: Some(0.98),
        },
        WordSpan {
            text: "world".to_string(),
            start_ms: 800,
            end_ms: 1300,
            confidence: Some(0.95),
        },
    ]
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(&self, _wav_path: &Path) -> Result<Vec<WordSpan>, RecognizerError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

        match self.behavior {
            MockBehavior::Working => Ok(self.spans.clone()),
            MockBehavior::Empty => Ok(Vec::new()),
            MockBehavior::Failing => Err(RecognizerError::EngineFailed(
                "mock recognizer configured to fail".to_string(),
            )),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && call % fail_every == 0 {
                    Err(RecognizerError::EngineFailed(format!(
                        "mock recognizer intermittent failure on call {}",
                        call
                    )))
                } else {
                    Ok(self.spans.clone())
                }
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
