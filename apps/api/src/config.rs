use anyhow::{bail, Context, Result};
use serde::Serialize;

const DEFAULT_OPENAI_API_VERSION: &str = "2024-02-01";

/// Credentials for an endpoint + key capability (language analysis, vision).
#[derive(Debug, Clone)]
pub struct ServiceCredentials {
    pub endpoint: String,
    pub key: String,
}

/// Credentials for the regional speech-to-text capability.
#[derive(Debug, Clone)]
pub struct SpeechCredentials {
    pub key: String,
    pub region: String,
}

/// Credentials for the generative chat capability.
#[derive(Debug, Clone)]
pub struct AdvisorCredentials {
    pub endpoint: String,
    pub key: String,
    pub deployment: String,
    pub api_version: String,
}

/// Where the service is running. Hosted deployments disable the voice stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Local,
    Hosted,
}

/// Application configuration loaded from environment variables.
///
/// Every capability credential set is independently optional: a missing set
/// disables only that capability's stage, never the whole pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub language: Option<ServiceCredentials>,
    pub vision: Option<ServiceCredentials>,
    pub speech: Option<SpeechCredentials>,
    pub advisor: Option<AdvisorCredentials>,
    pub deployment_mode: DeploymentMode,
    pub port: u16,
    pub rust_log: String,
    /// Capabilities whose credentials were only partially set. Treated as
    /// absent; surfaced as startup warnings once logging is initialized.
    pub partial_credentials: Vec<&'static str>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut partial = Vec::new();

        let language = credential_pair(
            "language",
            optional_env("AZURE_LANGUAGE_ENDPOINT"),
            optional_env("AZURE_LANGUAGE_KEY"),
            &mut partial,
        )
        .map(|(endpoint, key)| ServiceCredentials { endpoint, key });

        let vision = credential_pair(
            "vision",
            optional_env("AZURE_CV_ENDPOINT"),
            optional_env("AZURE_CV_KEY"),
            &mut partial,
        )
        .map(|(endpoint, key)| ServiceCredentials { endpoint, key });

        let speech = credential_pair(
            "speech",
            optional_env("AZURE_SPEECH_KEY"),
            optional_env("AZURE_SPEECH_REGION"),
            &mut partial,
        )
        .map(|(key, region)| SpeechCredentials { key, region });

        let advisor = advisor_credentials(&mut partial);

        Ok(Config {
            language,
            vision,
            speech,
            advisor,
            deployment_mode: parse_deployment_mode(optional_env("DEPLOYMENT_MODE"))?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            partial_credentials: partial,
        })
    }
}

/// Returns the variable's trimmed value, treating empty strings as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolves a two-variable credential set. Both present yields the pair;
/// both absent yields None; a half-set pair is recorded and treated as absent.
fn credential_pair(
    capability: &'static str,
    first: Option<String>,
    second: Option<String>,
    partial: &mut Vec<&'static str>,
) -> Option<(String, String)> {
    match (first, second) {
        (Some(first), Some(second)) => Some((first, second)),
        (None, None) => None,
        _ => {
            partial.push(capability);
            None
        }
    }
}

fn advisor_credentials(partial: &mut Vec<&'static str>) -> Option<AdvisorCredentials> {
    let endpoint = optional_env("AZURE_OPENAI_ENDPOINT");
    let key = optional_env("AZURE_OPENAI_KEY");
    let deployment = optional_env("AZURE_OPENAI_DEPLOYMENT");

    match (endpoint, key, deployment) {
        (Some(endpoint), Some(key), Some(deployment)) => Some(AdvisorCredentials {
            endpoint,
            key,
            deployment,
            api_version: optional_env("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_VERSION.to_string()),
        }),
        (None, None, None) => None,
        _ => {
            partial.push("generative");
            None
        }
    }
}

fn parse_deployment_mode(value: Option<String>) -> Result<DeploymentMode> {
    match value.as_deref() {
        None => Ok(DeploymentMode::Local),
        Some(mode) if mode.eq_ignore_ascii_case("local") => Ok(DeploymentMode::Local),
        Some(mode) if mode.eq_ignore_ascii_case("hosted") => Ok(DeploymentMode::Hosted),
        Some(other) => bail!("DEPLOYMENT_MODE must be 'local' or 'hosted', got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_pair_complete() {
        let mut partial = Vec::new();
        let pair = credential_pair(
            "language",
            Some("https://example.cognitiveservices.azure.com".to_string()),
            Some("secret".to_string()),
            &mut partial,
        );
        assert!(pair.is_some());
        assert!(partial.is_empty());
    }

    #[test]
    fn test_credential_pair_absent() {
        let mut partial = Vec::new();
        assert!(credential_pair("vision", None, None, &mut partial).is_none());
        assert!(partial.is_empty());
    }

    #[test]
    fn test_half_set_pair_is_recorded_and_absent() {
        let mut partial = Vec::new();
        let pair = credential_pair("speech", Some("key-only".to_string()), None, &mut partial);
        assert!(pair.is_none());
        assert_eq!(partial, vec!["speech"]);
    }

    #[test]
    fn test_deployment_mode_defaults_to_local() {
        assert_eq!(
            parse_deployment_mode(None).unwrap(),
            DeploymentMode::Local
        );
    }

    #[test]
    fn test_deployment_mode_hosted_case_insensitive() {
        assert_eq!(
            parse_deployment_mode(Some("Hosted".to_string())).unwrap(),
            DeploymentMode::Hosted
        );
    }

    #[test]
    fn test_deployment_mode_rejects_unknown_value() {
        assert!(parse_deployment_mode(Some("staging".to_string())).is_err());
    }
}
