/*!
 * Common test utilities for the vertisub test suite
 */

use std::fs;
use std::path::PathBuf;
use anyhow::Result;
use tempfile::TempDir;

use vertisub::recognizer::WordSpan;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Word-level recognizer output in the shape the Vosk engine emits:
/// one JSON object per utterance, each with a `result` word array.
pub fn sample_vosk_json() -> &'static str {
    r#"{"result": [{"conf": 0.98, "start": 0.25, "end": 0.70, "word": "hello"}, {"conf": 0.95, "start": 0.80, "end": 1.30, "word": "world"}], "text": "hello world"}
{"result": [{"conf": 0.91, "start": 3.10, "end": 3.55, "word": "again"}], "text": "again"}
{"text": ""}"#
}

/// A short sequence of word spans spread over roughly four seconds
pub fn sample_spans() -> Vec<WordSpan> {
    vec![
        WordSpan {
            text: "the".to_string(),
            start_ms: 200,
            end_ms: 400,
            confidence: Some(0.99),
        },
        WordSpan {
            text: "quick".to_string(),
            start_ms: 450,
            end_ms: 800,
            confidence: Some(0.97),
        },
        WordSpan {
            text: "brown".to_string(),
            start_ms: 850,
            end_ms: 1200,
            confidence: Some(0.96),
        },
        WordSpan {
            text: "fox".to_string(),
            start_ms: 2600,
            end_ms: 3000,
            confidence: Some(0.98),
        },
        WordSpan {
            text: "jumps".to_string(),
            start_ms: 3100,
            end_ms: 3600,
            confidence: Some(0.95),
        },
    ]
}
