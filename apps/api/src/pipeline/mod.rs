//! Pipeline orchestrator.
//!
//! One run: gather signals, resolve the canonical input, extract key
//! phrases, produce rule-based recommendations, then the single generative
//! slot. Every stage failure degrades the run instead of aborting it, so
//! `run` is infallible and always returns a report.

pub mod handlers;
pub mod input;
pub mod report;

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::advisor::AdvisorError;
use crate::capabilities::{Capability, CapabilityRegistry, UnavailableReason};
use crate::language::LanguageError;
use crate::recommend;
use crate::vision::OcrError;

use input::InputSignals;
use report::{
    AdviceErrorKind, Recommendation, RunReport, RunStatus, StageNotice, STAGE_OCR, STAGE_PHRASES,
};

/// One run's raw inputs, as parsed from the request.
#[derive(Debug, Default)]
pub struct RunRequest {
    pub typed_text: Option<String>,
    pub transcript: Option<String>,
    pub image: Option<ImageUpload>,
}

/// An uploaded image part.
#[derive(Debug)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub content_type: String,
}

pub struct Pipeline {
    registry: Arc<CapabilityRegistry>,
}

impl Pipeline {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Executes one run. Degradations become notices or the advisor error
    /// slot; the report is produced unconditionally.
    pub async fn run(&self, request: RunRequest) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut notices: Vec<StageNotice> = Vec::new();

        let mut signals = InputSignals {
            typed_text: request.typed_text,
            speech_transcript: request.transcript,
            ocr_text: None,
        };

        if let Some(image) = request.image {
            match &self.registry.vision {
                Capability::Ready(engine) => {
                    match engine.read_text(image.bytes, &image.content_type).await {
                        Ok(text) => {
                            debug!(%run_id, chars = text.len(), "image text recognized");
                            signals.ocr_text = Some(text);
                        }
                        Err(err) => {
                            warn!(%run_id, error = %err, "image text recognition degraded");
                            notices.push(StageNotice::new(
                                STAGE_OCR,
                                ocr_code(&err),
                                err.to_string(),
                            ));
                        }
                    }
                }
                Capability::Unavailable(reason) => {
                    warn!(%run_id, reason = reason.code(), "image ignored");
                    notices.push(StageNotice::new(
                        STAGE_OCR,
                        reason.code(),
                        format!("image ignored: {}", reason.message()),
                    ));
                }
            }
        }

        let Some(canonical) = input::resolve(&signals) else {
            info!(%run_id, "run ended without usable input");
            return RunReport {
                run_id,
                status: RunStatus::NoInput,
                input: None,
                key_phrases: Vec::new(),
                recommendations: Vec::new(),
                notices,
                started_at,
                completed_at: Utc::now(),
            };
        };
        info!(%run_id, source = ?canonical.source, "canonical input resolved");

        let key_phrases = match &self.registry.language {
            Capability::Ready(extractor) => {
                match extractor.extract_key_phrases(&canonical.text).await {
                    Ok(phrases) => {
                        debug!(%run_id, count = phrases.len(), "key phrases extracted");
                        phrases
                    }
                    Err(err) => {
                        warn!(%run_id, error = %err, "phrase extraction degraded");
                        notices.push(StageNotice::new(
                            STAGE_PHRASES,
                            phrase_code(&err),
                            err.to_string(),
                        ));
                        Vec::new()
                    }
                }
            }
            Capability::Unavailable(reason) => {
                warn!(%run_id, reason = reason.code(), "phrase extraction skipped");
                notices.push(StageNotice::new(
                    STAGE_PHRASES,
                    reason.code(),
                    format!("phrase extraction skipped: {}", reason.message()),
                ));
                Vec::new()
            }
        };

        let mut recommendations: Vec<Recommendation> =
            recommend::recommend_careers(&key_phrases, &canonical.text)
                .into_iter()
                .map(|text| Recommendation::RuleBased { text })
                .collect();

        // The generative slot is always the last entry.
        let advice = match &self.registry.advisor {
            Capability::Ready(advisor) => match advisor.suggest_careers(&canonical.text).await {
                Ok(text) => {
                    debug!(%run_id, chars = text.len(), "generative advice received");
                    Recommendation::Generative { text }
                }
                Err(err) => {
                    warn!(%run_id, error = %err, "generative advice failed");
                    Recommendation::Error {
                        kind: advice_error_kind(&err),
                        message: err.to_string(),
                    }
                }
            },
            Capability::Unavailable(reason) => {
                debug!(%run_id, reason = reason.code(), "generative advice skipped");
                Recommendation::Error {
                    kind: unavailable_kind(reason),
                    message: format!("generative advice unavailable: {}", reason.message()),
                }
            }
        };
        recommendations.push(advice);

        info!(
            %run_id,
            recommendations = recommendations.len(),
            notices = notices.len(),
            "run completed"
        );

        RunReport {
            run_id,
            status: RunStatus::Completed,
            input: Some(canonical),
            key_phrases,
            recommendations,
            notices,
            started_at,
            completed_at: Utc::now(),
        }
    }
}

fn ocr_code(error: &OcrError) -> &'static str {
    match error {
        OcrError::UnsupportedImageType(_) => "invalid_image_type",
        OcrError::Submission(_) => "ocr_submission_failed",
        OcrError::OperationFailed(_) => "ocr_failed",
        OcrError::Timeout { .. } => "ocr_timeout",
    }
}

fn phrase_code(error: &LanguageError) -> &'static str {
    match error {
        LanguageError::Document { .. } => "phrase_extraction_rejected",
        _ => "phrase_extraction_failed",
    }
}

fn advice_error_kind(error: &AdvisorError) -> AdviceErrorKind {
    match error {
        AdvisorError::RateLimited => AdviceErrorKind::RateLimited,
        _ => AdviceErrorKind::General,
    }
}

fn unavailable_kind(reason: &UnavailableReason) -> AdviceErrorKind {
    match reason {
        UnavailableReason::MissingCredentials => AdviceErrorKind::MissingCredentials,
        UnavailableReason::DisabledByDeployment => AdviceErrorKind::DisabledByDeployment,
    }
}
