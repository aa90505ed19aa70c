/*!
 * Vosk recognizer backend.
 *
 * Invokes an external Vosk recognizer process per segment and parses its
 * word-level JSON output. The engine expects 16kHz mono 16-bit PCM WAV
 * input (produced by the renderer's audio extraction step).
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::app_config::RecognizerConfig;
use crate::errors::RecognizerError;
use crate::recognizer::{Recognizer, WordSpan};

/// Recognizer backend that shells out to a Vosk transcriber command
#[derive(Debug)]
pub struct VoskRecognizer {
    /// Recognizer executable
    command: String,

    /// Acoustic/language model directory
    model_dir: PathBuf,

    /// Timeout for one recognition run
    timeout_secs: u64,
}

impl VoskRecognizer {
    /// Create a new Vosk recognizer from the configuration.
    ///
    /// The model directory must exist; a missing model is a configuration
    /// error reported before any processing starts.
    pub fn new(config: &RecognizerConfig) -> Result<Self, RecognizerError> {
        if !config.model_dir.is_dir() {
            return Err(RecognizerError::ConfigError(format!(
                "model directory not found: {}",
                config.model_dir.display()
            )));
        }

        Ok(Self {
            command: config.command.clone(),
            model_dir: config.model_dir.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl Recognizer for VoskRecognizer {
    async fn recognize(&self, wav_path: &Path) -> Result<Vec<WordSpan>, RecognizerError> {
        let recognize_future = Command::new(&self.command)
            .args([
                "-m", self.model_dir.to_str().unwrap_or_default(),
                "-t", "json",
                "-i", wav_path.to_str().unwrap_or_default(),
            ])
            .kill_on_drop(true)
            .output();

        let timeout_duration = std::time::Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = recognize_future => {
                result.map_err(|e| RecognizerError::InvocationFailed(e.to_string()))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(RecognizerError::EngineFailed(format!(
                    "recognizer timed out after {} seconds",
                    self.timeout_secs
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognizerError::EngineFailed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let spans = parse_word_results(&stdout)?;
        debug!("Recognized {} word spans from {:?}", spans.len(), wav_path);

        Ok(spans)
    }

    fn name(&self) -> &str {
        "vosk"
    }
}

/// Parse Vosk word-level result JSON into chronological word spans.
///
/// The engine emits one result object per utterance, each carrying a
/// `result` array of `{word, start, end, conf}` entries with times in
/// seconds. Accepts a single object, a JSON array of objects, or
/// newline-delimited objects. Utterances without a `result` key (silence,
/// partials) are skipped. Empty output yields an empty span list.
pub fn parse_word_results(raw: &str) -> Result<Vec<WordSpan>, RecognizerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let utterances: Vec<Value> = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items,
        Ok(single) => vec![single],
        Err(_) => {
            // Newline-delimited objects, one per accepted waveform
            let mut items = Vec::new();
            for line in trimmed.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Value>(line) {
                    Ok(value) => items.push(value),
                    Err(e) => {
                        return Err(RecognizerError::ParseError(format!(
                            "invalid result line: {}",
                            e
                        )));
                    }
                }
            }
            items
        }
    };

    let mut spans = Vec::new();
    for utterance in &utterances {
        let Some(words) = utterance.get("result").and_then(|r| r.as_array()) else {
            continue;
        };

        for word in words {
            let text = word
                .get("word")
                .and_then(|w| w.as_str())
                .unwrap_or_default()
                .to_string();
            if text.is_empty() {
                continue;
            }

            let start_secs = word.get("start").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let end_secs = word.get("end").and_then(|v| v.as_f64()).unwrap_or(start_secs);
            let confidence = word.get("conf").and_then(|v| v.as_f64());

            let start_ms = (start_secs * 1000.0).round() as u64;
            let end_ms = (end_secs * 1000.0).round() as u64;
            if end_ms <= start_ms {
                warn!("Skipping word with degenerate timing: {:?}", text);
                continue;
            }

            spans.push(WordSpan {
                text,
                start_ms,
                end_ms,
                confidence,
            });
        }
    }

    // Engines emit utterances in order, but keep the contract explicit
    spans.sort_by_key(|s| s.start_ms);

    Ok(spans)
}
