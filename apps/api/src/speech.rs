//! Speech transcriber adapter for the short-audio recognize-once capability.
//!
//! Voice capture feeds the pipeline as a text signal: the transcription
//! endpoint runs this adapter and the client submits the transcript with the
//! next run request. Silence or unintelligible audio is a no-match outcome,
//! not an error.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::SpeechCredentials;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const RECOGNITION_LANGUAGE: &str = "en-US";
const WAV_CONTENT_TYPE: &str = "audio/wav; codecs=audio/pcm; samplerate=16000";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("speech recognition ended with status '{status}'")]
    Recognition { status: String },
}

/// Outcome of a recognize-once call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    Recognized(String),
    NoMatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecognitionResponse {
    recognition_status: String,
    display_text: Option<String>,
}

/// Transcribes one short audio clip.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn recognize_once(&self, audio: Bytes) -> Result<Transcription, SpeechError>;
}

/// Recognize-once client for the regional speech-to-text REST surface.
#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    key: String,
    region: String,
}

impl SpeechClient {
    pub fn new(credentials: SpeechCredentials) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            key: credentials.key,
            region: credentials.region,
        }
    }
}

#[async_trait]
impl SpeechTranscriber for SpeechClient {
    async fn recognize_once(&self, audio: Bytes) -> Result<Transcription, SpeechError> {
        let url = format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language={}&format=simple",
            self.region, RECOGNITION_LANGUAGE
        );

        let response = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(CONTENT_TYPE, WAV_CONTENT_TYPE)
            .header(ACCEPT, "application/json")
            .body(audio)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let payload: RecognitionResponse = response.json().await?;
        debug!(status = %payload.recognition_status, "recognize-once completed");
        map_recognition(payload)
    }
}

/// Maps the provider's recognition status onto the transcription outcome.
/// Silence and babble timeouts count as no-match, not errors.
fn map_recognition(response: RecognitionResponse) -> Result<Transcription, SpeechError> {
    match response.recognition_status.as_str() {
        "Success" => Ok(Transcription::Recognized(
            response.display_text.unwrap_or_default(),
        )),
        "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => Ok(Transcription::NoMatch),
        other => Err(SpeechError::Recognition {
            status: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_maps_to_recognized_transcript() {
        let json = r#"{
            "RecognitionStatus": "Success",
            "DisplayText": "I enjoy biology and lab work.",
            "Offset": 300000,
            "Duration": 24500000
        }"#;
        let response: RecognitionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            map_recognition(response).unwrap(),
            Transcription::Recognized("I enjoy biology and lab work.".to_string())
        );
    }

    #[test]
    fn test_no_match_is_an_outcome_not_an_error() {
        let json = r#"{"RecognitionStatus": "NoMatch", "Offset": 0, "Duration": 0}"#;
        let response: RecognitionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(map_recognition(response).unwrap(), Transcription::NoMatch);
    }

    #[test]
    fn test_silence_timeout_counts_as_no_match() {
        let response = RecognitionResponse {
            recognition_status: "InitialSilenceTimeout".to_string(),
            display_text: None,
        };
        assert_eq!(map_recognition(response).unwrap(), Transcription::NoMatch);
    }

    #[test]
    fn test_unknown_status_surfaces_as_recognition_error() {
        let response = RecognitionResponse {
            recognition_status: "Error".to_string(),
            display_text: None,
        };
        match map_recognition(response) {
            Err(SpeechError::Recognition { status }) => assert_eq!(status, "Error"),
            other => panic!("expected Recognition error, got {other:?}"),
        }
    }
}
