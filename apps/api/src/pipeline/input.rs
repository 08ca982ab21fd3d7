//! Canonical input resolution.
//!
//! A run may carry up to three text signals. Exactly one becomes the
//! canonical input, by fixed precedence: OCR text, then the speech
//! transcript, then typed text. Whitespace-only signals count as absent.

use serde::Serialize;

/// The text signals gathered for one run.
#[derive(Debug, Default)]
pub struct InputSignals {
    pub typed_text: Option<String>,
    pub speech_transcript: Option<String>,
    pub ocr_text: Option<String>,
}

/// Which signal won precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Ocr,
    Speech,
    Typed,
}

/// The single text a run analyzes, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalInput {
    pub text: String,
    pub source: InputSource,
}

/// Picks the canonical input, or `None` when every signal is absent.
pub fn resolve(signals: &InputSignals) -> Option<CanonicalInput> {
    let candidates = [
        (InputSource::Ocr, &signals.ocr_text),
        (InputSource::Speech, &signals.speech_transcript),
        (InputSource::Typed, &signals.typed_text),
    ];

    for (source, signal) in candidates {
        if let Some(text) = signal.as_deref().and_then(non_empty) {
            return Some(CanonicalInput {
                text: text.to_string(),
                source,
            });
        }
    }
    None
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
