//! Run report types.
//!
//! A run always produces a report. Degradations surface as typed stage
//! notices and as the advisor error slot, never as a missing report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::input::CanonicalInput;

pub const STAGE_OCR: &str = "ocr";
pub const STAGE_PHRASES: &str = "phrases";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    NoInput,
}

/// Why the generative slot carries an error instead of advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceErrorKind {
    RateLimited,
    General,
    MissingCredentials,
    DisabledByDeployment,
}

/// One entry in the ordered recommendation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    RuleBased { text: String },
    Generative { text: String },
    Error { kind: AdviceErrorKind, message: String },
}

/// A stage that degraded instead of stopping the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageNotice {
    pub stage: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl StageNotice {
    pub fn new(stage: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            code,
            message: message.into(),
        }
    }
}

/// The structured outcome of one pipeline run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<CanonicalInput>,
    pub key_phrases: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub notices: Vec<StageNotice>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
