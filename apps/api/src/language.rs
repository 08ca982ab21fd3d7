//! Phrase extractor adapter for the key-phrase analysis capability.
//!
//! One single-document batch per run, no retries. A per-document rejection
//! reported inside an otherwise successful response is a different failure
//! than a transport or HTTP error, and callers must be able to tell them
//! apart.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ServiceCredentials;

const KEY_PHRASES_PATH: &str = "/text/analytics/v3.1/keyPhrases";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const DOCUMENT_LANGUAGE: &str = "en";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("document rejected by the language capability ({code}): {message}")]
    Document { code: String, message: String },

    #[error("language capability returned no result for the submitted document")]
    MissingDocument,
}

#[derive(Debug, Serialize)]
struct KeyPhrasesRequest<'a> {
    documents: Vec<AnalysisDocument<'a>>,
}

#[derive(Debug, Serialize)]
struct AnalysisDocument<'a> {
    id: &'a str,
    language: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct KeyPhrasesResponse {
    #[serde(default)]
    documents: Vec<DocumentKeyPhrases>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
struct DocumentKeyPhrases {
    #[serde(rename = "keyPhrases")]
    key_phrases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    error: ServiceErrorBody,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ServiceErrorBody,
}

/// Extracts salient key phrases from a single text.
#[async_trait]
pub trait PhraseExtractor: Send + Sync {
    async fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>, LanguageError>;
}

/// Key-phrase client for the Text Analytics REST surface.
#[derive(Clone)]
pub struct LanguageClient {
    client: Client,
    endpoint: String,
    key: String,
}

impl LanguageClient {
    pub fn new(credentials: ServiceCredentials) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: credentials.endpoint,
            key: credentials.key,
        }
    }
}

#[async_trait]
impl PhraseExtractor for LanguageClient {
    async fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>, LanguageError> {
        let request_body = KeyPhrasesRequest {
            documents: vec![AnalysisDocument {
                id: "1",
                language: DOCUMENT_LANGUAGE,
                text,
            }],
        };

        let url = format!("{}{}", self.endpoint.trim_end_matches('/'), KEY_PHRASES_PATH);
        let response = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(LanguageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: KeyPhrasesResponse = response.json().await?;
        let phrases = into_phrases(payload)?;
        debug!(count = phrases.len(), "key phrase extraction succeeded");
        Ok(phrases)
    }
}

/// Maps the single-document batch response onto its one outcome.
fn into_phrases(response: KeyPhrasesResponse) -> Result<Vec<String>, LanguageError> {
    if let Some(document) = response.documents.into_iter().next() {
        return Ok(document.key_phrases);
    }
    if let Some(rejected) = response.errors.into_iter().next() {
        return Err(LanguageError::Document {
            code: rejected.error.code,
            message: rejected.error.message,
        });
    }
    Err(LanguageError::MissingDocument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_deserializes_phrases() {
        let json = r#"{
            "documents": [
                {"id": "1", "keyPhrases": ["machine learning", "career change"], "warnings": []}
            ],
            "errors": [],
            "modelVersion": "2022-10-01"
        }"#;
        let response: KeyPhrasesResponse = serde_json::from_str(json).unwrap();
        let phrases = into_phrases(response).unwrap();
        assert_eq!(phrases, vec!["machine learning", "career change"]);
    }

    #[test]
    fn test_document_error_is_distinct_from_transport_error() {
        let json = r#"{
            "documents": [],
            "errors": [
                {"id": "1", "error": {"code": "InvalidDocument", "message": "Document text is empty."}}
            ]
        }"#;
        let response: KeyPhrasesResponse = serde_json::from_str(json).unwrap();
        let error = into_phrases(response).unwrap_err();
        match error {
            LanguageError::Document { code, message } => {
                assert_eq!(code, "InvalidDocument");
                assert!(message.contains("empty"));
            }
            other => panic!("expected Document error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_batch_yields_missing_document() {
        let response: KeyPhrasesResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            into_phrases(response),
            Err(LanguageError::MissingDocument)
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let request = KeyPhrasesRequest {
            documents: vec![AnalysisDocument {
                id: "1",
                language: DOCUMENT_LANGUAGE,
                text: "I enjoy robotics",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["documents"][0]["id"], "1");
        assert_eq!(json["documents"][0]["language"], "en");
        assert_eq!(json["documents"][0]["text"], "I enjoy robotics");
    }
}
