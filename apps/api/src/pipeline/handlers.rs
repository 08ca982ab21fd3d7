use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::capabilities::{Capability, CapabilityStatus};
use crate::config::DeploymentMode;
use crate::errors::AppError;
use crate::pipeline::report::RunReport;
use crate::pipeline::{ImageUpload, RunRequest};
use crate::speech::Transcription;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CapabilitiesResponse {
    pub deployment_mode: DeploymentMode,
    pub capabilities: Vec<CapabilityStatus>,
}

#[derive(Serialize)]
pub struct TranscriptionResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// GET /api/v1/capabilities
pub async fn handle_capabilities(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        deployment_mode: state.config.deployment_mode,
        capabilities: state.registry.statuses(),
    })
}

/// POST /api/v1/transcriptions
pub async fn handle_transcription(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, AppError> {
    let transcriber = match &state.registry.speech {
        Capability::Ready(transcriber) => transcriber.clone(),
        Capability::Unavailable(reason) => {
            return Err(AppError::ServiceUnavailable(format!(
                "Speech transcription is unavailable: {}",
                reason.message()
            )))
        }
    };

    let audio = read_audio_field(multipart).await?;
    match transcriber.recognize_once(audio).await {
        Ok(Transcription::Recognized(transcript)) => Ok(Json(TranscriptionResponse {
            status: "recognized",
            transcript: Some(transcript),
        })),
        Ok(Transcription::NoMatch) => Ok(Json(TranscriptionResponse {
            status: "no_match",
            transcript: None,
        })),
        Err(err) => Err(AppError::Speech(err.to_string())),
    }
}

/// POST /api/v1/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RunReport>, AppError> {
    let request = parse_run_request(multipart).await?;
    Ok(Json(state.pipeline.run(request).await))
}

async fn read_audio_field(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Invalid multipart body: {err}")))?
    {
        if field.name() == Some("audio") {
            let audio = field.bytes().await.map_err(|err| {
                AppError::Validation(format!("Failed to read field 'audio': {err}"))
            })?;
            if audio.is_empty() {
                return Err(AppError::Validation("Audio field is empty".to_string()));
            }
            return Ok(audio);
        }
    }
    Err(AppError::Validation(
        "Missing required multipart field 'audio'".to_string(),
    ))
}

/// Collects the run inputs from multipart fields `text`, `transcript` and
/// `image`. Unknown fields are ignored.
async fn parse_run_request(mut multipart: Multipart) -> Result<RunRequest, AppError> {
    let mut request = RunRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Invalid multipart body: {err}")))?
    {
        // name/content_type borrow the field; capture before consuming it.
        let name = field.name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        match name.as_deref() {
            Some("text") => {
                request.typed_text = Some(field.text().await.map_err(|err| {
                    AppError::Validation(format!("Failed to read field 'text': {err}"))
                })?);
            }
            Some("transcript") => {
                request.transcript = Some(field.text().await.map_err(|err| {
                    AppError::Validation(format!("Failed to read field 'transcript': {err}"))
                })?);
            }
            Some("image") => {
                let bytes = field.bytes().await.map_err(|err| {
                    AppError::Validation(format!("Failed to read field 'image': {err}"))
                })?;
                request.image = Some(ImageUpload {
                    bytes,
                    content_type: content_type
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                });
            }
            _ => {}
        }
    }

    Ok(request)
}
