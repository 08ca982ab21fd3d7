//! Capability registry.
//!
//! Each external capability resolves once at startup into either a ready
//! adapter or an explicit unavailable marker with a reason. Stages consult
//! their slot instead of re-checking credentials, so a run can degrade
//! per stage without any scattered presence checks.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::advisor::{AdvisorClient, CareerAdvisor};
use crate::config::{Config, DeploymentMode};
use crate::language::{LanguageClient, PhraseExtractor};
use crate::speech::{SpeechClient, SpeechTranscriber};
use crate::vision::{OcrEngine, VisionClient};

/// Why a capability slot is not serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    MissingCredentials,
    DisabledByDeployment,
}

impl UnavailableReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnavailableReason::MissingCredentials => "missing_credentials",
            UnavailableReason::DisabledByDeployment => "disabled_by_deployment",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            UnavailableReason::MissingCredentials => "credentials are not configured",
            UnavailableReason::DisabledByDeployment => "disabled for hosted deployments",
        }
    }
}

/// A capability slot: a ready adapter or the reason it is unavailable.
pub enum Capability<T> {
    Ready(T),
    Unavailable(UnavailableReason),
}

/// Readiness of one capability, as reported by the capabilities endpoint.
#[derive(Debug, Serialize)]
pub struct CapabilityStatus {
    pub name: &'static str,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

pub struct CapabilityRegistry {
    pub language: Capability<Arc<dyn PhraseExtractor>>,
    pub vision: Capability<Arc<dyn OcrEngine>>,
    pub speech: Capability<Arc<dyn SpeechTranscriber>>,
    pub advisor: Capability<Arc<dyn CareerAdvisor>>,
}

impl CapabilityRegistry {
    /// Resolves every slot from configuration. Hosted deployments disable
    /// the speech slot even when its credentials are present.
    pub fn from_config(config: &Config) -> Self {
        let language = match &config.language {
            Some(credentials) => Capability::Ready(
                Arc::new(LanguageClient::new(credentials.clone())) as Arc<dyn PhraseExtractor>,
            ),
            None => Capability::Unavailable(UnavailableReason::MissingCredentials),
        };

        let vision = match &config.vision {
            Some(credentials) => Capability::Ready(
                Arc::new(VisionClient::new(credentials.clone())) as Arc<dyn OcrEngine>,
            ),
            None => Capability::Unavailable(UnavailableReason::MissingCredentials),
        };

        let speech = if config.deployment_mode == DeploymentMode::Hosted {
            Capability::Unavailable(UnavailableReason::DisabledByDeployment)
        } else {
            match &config.speech {
                Some(credentials) => Capability::Ready(
                    Arc::new(SpeechClient::new(credentials.clone())) as Arc<dyn SpeechTranscriber>,
                ),
                None => Capability::Unavailable(UnavailableReason::MissingCredentials),
            }
        };

        let advisor = match &config.advisor {
            Some(credentials) => Capability::Ready(
                Arc::new(AdvisorClient::new(credentials.clone())) as Arc<dyn CareerAdvisor>,
            ),
            None => Capability::Unavailable(UnavailableReason::MissingCredentials),
        };

        let registry = Self {
            language,
            vision,
            speech,
            advisor,
        };
        for status in registry.statuses() {
            match status.reason {
                None => info!(capability = status.name, "capability ready"),
                Some(reason) => {
                    warn!(capability = status.name, reason, "capability unavailable")
                }
            }
        }
        registry
    }

    /// Readiness of every slot, in stable order.
    pub fn statuses(&self) -> Vec<CapabilityStatus> {
        fn status<T>(name: &'static str, slot: &Capability<T>) -> CapabilityStatus {
            match slot {
                Capability::Ready(_) => CapabilityStatus {
                    name,
                    ready: true,
                    reason: None,
                },
                Capability::Unavailable(reason) => CapabilityStatus {
                    name,
                    ready: false,
                    reason: Some(reason.code()),
                },
            }
        }

        vec![
            status("language", &self.language),
            status("vision", &self.vision),
            status("speech", &self.speech),
            status("generative", &self.advisor),
        ]
    }
}
