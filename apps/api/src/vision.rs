//! OCR job driver for the vision Read capability.
//!
//! Submitting an image starts an asynchronous recognition job on the provider
//! side; the driver polls the returned operation until it leaves the
//! notStarted/running states and then concatenates the recognized lines in
//! document reading order. Polling is bounded: a job that never reaches a
//! terminal status yields `OcrError::Timeout` instead of hanging the run.
//! Submission is never retried.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::ServiceCredentials;

const READ_ANALYZE_PATH: &str = "/vision/v3.2/read/analyze";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Image content types accepted for submission. Checked before any network
/// call; `image/jpg` is tolerated as a common client spelling.
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// Fixed delay between status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Maximum number of status polls before the job is declared timed out.
const MAX_POLLS: u32 = 60;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("unsupported image content type '{0}'")]
    UnsupportedImageType(String),

    #[error("read submission failed: {0}")]
    Submission(String),

    #[error("read operation failed: {0}")]
    OperationFailed(String),

    #[error("read operation still running after {polls} polls")]
    Timeout { polls: u32 },
}

#[derive(Debug, Deserialize)]
struct ReadOperation {
    status: ReadStatus,
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<AnalyzeResult>,
    error: Option<OperationError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ReadStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(rename = "readResults")]
    read_results: Vec<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
struct ReadLine {
    text: String,
}

/// Recognizes the text contained in a submitted image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn read_text(&self, image: Bytes, content_type: &str) -> Result<String, OcrError>;
}

/// OCR client for the vision Read REST surface.
#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    endpoint: String,
    key: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl VisionClient {
    pub fn new(credentials: ServiceCredentials) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: credentials.endpoint,
            key: credentials.key,
            poll_interval: POLL_INTERVAL,
            max_polls: MAX_POLLS,
        }
    }

    /// Submits the image and returns the operation URL to poll.
    async fn submit(&self, image: Bytes, content_type: &str) -> Result<String, OcrError> {
        let url = format!("{}{}", self.endpoint.trim_end_matches('/'), READ_ANALYZE_PATH);
        let response = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(image)
            .send()
            .await
            .map_err(|e| OcrError::Submission(format!("submit request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() != 202 {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Submission(format!(
                "submit returned status {status}: {body}"
            )));
        }

        let location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                OcrError::Submission("submit response missing Operation-Location header".to_string())
            })?;

        Ok(location.to_string())
    }

    async fn fetch_operation(&self, operation_url: &str) -> Result<ReadOperation, OcrError> {
        let response = self
            .client
            .get(operation_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .send()
            .await
            .map_err(|e| OcrError::OperationFailed(format!("poll request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::OperationFailed(format!(
                "poll returned status {status}: {body}"
            )));
        }

        response
            .json::<ReadOperation>()
            .await
            .map_err(|e| OcrError::OperationFailed(format!("invalid read operation payload: {e}")))
    }
}

#[async_trait]
impl OcrEngine for VisionClient {
    async fn read_text(&self, image: Bytes, content_type: &str) -> Result<String, OcrError> {
        let normalized = content_type.to_ascii_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&normalized.as_str()) {
            return Err(OcrError::UnsupportedImageType(content_type.to_string()));
        }

        let operation_url = self.submit(image, &normalized).await?;
        let operation_id = operation_url.rsplit('/').next().unwrap_or(&operation_url);
        debug!(operation_id, "read operation accepted");

        let operation = poll_until_terminal(
            || self.fetch_operation(&operation_url),
            self.poll_interval,
            self.max_polls,
        )
        .await?;

        match operation.status {
            ReadStatus::Succeeded => {
                let text = operation
                    .analyze_result
                    .map(|result| collect_text(&result))
                    .unwrap_or_default();
                debug!(chars = text.len(), "read operation succeeded");
                Ok(text)
            }
            _ => Err(OcrError::OperationFailed(
                operation
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "read operation reported status 'failed'".to_string()),
            )),
        }
    }
}

/// Polls `fetch` at a fixed interval until the operation leaves the
/// notStarted/running states, erroring out after `max_polls` attempts.
async fn poll_until_terminal<F, Fut>(
    mut fetch: F,
    interval: Duration,
    max_polls: u32,
) -> Result<ReadOperation, OcrError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ReadOperation, OcrError>>,
{
    for _ in 0..max_polls {
        let operation = fetch().await?;
        match operation.status {
            ReadStatus::Succeeded | ReadStatus::Failed => return Ok(operation),
            ReadStatus::NotStarted | ReadStatus::Running => tokio::time::sleep(interval).await,
        }
    }
    Err(OcrError::Timeout { polls: max_polls })
}

/// Concatenates recognized line text in page order, then line order, joined
/// by single spaces and trimmed.
fn collect_text(result: &AnalyzeResult) -> String {
    result
        .read_results
        .iter()
        .flat_map(|page| page.lines.iter())
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn operation(status: ReadStatus) -> ReadOperation {
        ReadOperation {
            status,
            analyze_result: None,
            error: None,
        }
    }

    fn credentials() -> ServiceCredentials {
        ServiceCredentials {
            endpoint: "https://example.cognitiveservices.azure.com".to_string(),
            key: "test-key".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unsupported_content_type_rejected_before_submission() {
        let client = VisionClient::new(credentials());
        let result = client
            .read_text(Bytes::from_static(b"%PDF-1.7"), "application/pdf")
            .await;
        match result {
            Err(OcrError::UnsupportedImageType(content_type)) => {
                assert_eq!(content_type, "application/pdf");
            }
            other => panic!("expected UnsupportedImageType, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_content_type_check_is_case_insensitive() {
        let client = VisionClient::new(credentials());
        // IMAGE/GIF lowercases to image/gif, still outside the allow-list.
        let result = client.read_text(Bytes::from_static(b"GIF89a"), "IMAGE/GIF").await;
        assert!(matches!(result, Err(OcrError::UnsupportedImageType(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_forever_running_job_times_out_at_poll_bound() {
        // A job that never leaves the running state must end in a timeout,
        // not an endless poll loop.
        let calls = Rc::new(Cell::new(0u32));
        let counter = calls.clone();

        let result = poll_until_terminal(
            move || {
                counter.set(counter.get() + 1);
                async { Ok(operation(ReadStatus::Running)) }
            },
            Duration::from_secs(1),
            60,
        )
        .await;

        assert!(matches!(result, Err(OcrError::Timeout { polls: 60 })));
        assert_eq!(calls.get(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_stops_at_first_terminal_status() {
        let calls = Rc::new(Cell::new(0u32));
        let counter = calls.clone();

        let result = poll_until_terminal(
            move || {
                counter.set(counter.get() + 1);
                let status = if counter.get() < 3 {
                    ReadStatus::Running
                } else {
                    ReadStatus::Succeeded
                };
                async move { Ok(operation(status)) }
            },
            Duration::from_secs(1),
            60,
        )
        .await
        .unwrap();

        assert_eq!(result.status, ReadStatus::Succeeded);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_is_terminal_not_timeout() {
        let result = poll_until_terminal(
            || async { Ok(operation(ReadStatus::Failed)) },
            Duration::from_secs(1),
            5,
        )
        .await
        .unwrap();
        assert_eq!(result.status, ReadStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_aborts_polling() {
        let result: Result<ReadOperation, OcrError> = poll_until_terminal(
            || async { Err(OcrError::OperationFailed("connection reset".to_string())) },
            Duration::from_secs(1),
            5,
        )
        .await;
        assert!(matches!(result, Err(OcrError::OperationFailed(_))));
    }

    #[test]
    fn test_collect_text_joins_pages_and_lines_in_order() {
        let result = AnalyzeResult {
            read_results: vec![
                ReadResult {
                    lines: vec![
                        ReadLine {
                            text: "Career Fair".to_string(),
                        },
                        ReadLine {
                            text: "Robotics and AI".to_string(),
                        },
                    ],
                },
                ReadResult {
                    lines: vec![ReadLine {
                        text: "Saturday 10am".to_string(),
                    }],
                },
            ],
        };
        assert_eq!(collect_text(&result), "Career Fair Robotics and AI Saturday 10am");
    }

    #[test]
    fn test_collect_text_empty_result_is_empty_string() {
        let result = AnalyzeResult {
            read_results: vec![],
        };
        assert_eq!(collect_text(&result), "");
    }

    #[test]
    fn test_read_operation_deserializes_succeeded_payload() {
        let json = r#"{
            "status": "succeeded",
            "createdDateTime": "2024-06-01T12:00:00Z",
            "lastUpdatedDateTime": "2024-06-01T12:00:03Z",
            "analyzeResult": {
                "version": "3.2.0",
                "readResults": [
                    {
                        "page": 1,
                        "lines": [
                            {"boundingBox": [0, 0, 1, 0, 1, 1, 0, 1], "text": "Open day"},
                            {"boundingBox": [0, 2, 1, 2, 1, 3, 0, 3], "text": "Biotech lab"}
                        ]
                    }
                ]
            }
        }"#;
        let operation: ReadOperation = serde_json::from_str(json).unwrap();
        assert_eq!(operation.status, ReadStatus::Succeeded);
        let text = collect_text(&operation.analyze_result.unwrap());
        assert_eq!(text, "Open day Biotech lab");
    }

    #[test]
    fn test_read_operation_deserializes_not_started_and_failed() {
        let pending: ReadOperation =
            serde_json::from_str(r#"{"status": "notStarted"}"#).unwrap();
        assert_eq!(pending.status, ReadStatus::NotStarted);

        let failed: ReadOperation = serde_json::from_str(
            r#"{"status": "failed", "error": {"code": "InternalServerError", "message": "Analyze failed."}}"#,
        )
        .unwrap();
        assert_eq!(failed.status, ReadStatus::Failed);
        assert_eq!(failed.error.unwrap().message, "Analyze failed.");
    }
}
