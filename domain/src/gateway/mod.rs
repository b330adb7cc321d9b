//! Clients for the external services the pipeline talks to, built from config.

use crate::error::Error;
use log::*;
use meeting_ai::traits::analysis::Provider as AnalysisProvider;
use meeting_ai::traits::directory::Provider as Directory;
use meeting_ai::traits::task_board::Provider as TaskBoard;
use meeting_ai::Error as MeetingAiError;
use meeting_auth::identity::{IdentityVerifier, SupabaseVerifier};
use meeting_auth::oauth::ClientCredentials;
use reqwest::StatusCode;
use secrecy::SecretString;
use service::config::Config;
use std::sync::Arc;

pub mod gemini;
pub mod planner;

/// Every configured gateway. A gateway whose settings are missing is `None`.
#[derive(Clone, Default)]
pub struct Gateways {
    pub analysis: Option<Arc<dyn AnalysisProvider>>,
    pub task_board: Option<Arc<dyn TaskBoard>>,
    pub directory: Option<Arc<dyn Directory>>,
    pub identity: Option<Arc<dyn IdentityVerifier>>,
}

impl Gateways {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut gateways = Gateways::default();

        if config.gemini_api_key().is_some() {
            gateways.analysis = Some(Arc::new(gemini::GeminiClient::new(
                config.gemini_api_key(),
                config.gemini_model(),
                config.gemini_base_url(),
            )?));
        } else {
            warn!("GEMINI_API_KEY is not set, transcript processing is disabled");
        }

        match (
            config.microsoft_tenant_id(),
            config.microsoft_client_id(),
            config.microsoft_client_secret(),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                let tokens = ClientCredentials::microsoft(
                    config.microsoft_login_base_url(),
                    &tenant_id,
                    client_id,
                    SecretString::new(client_secret),
                )?;
                let planner = Arc::new(planner::GraphPlannerClient::new(
                    config.microsoft_graph_base_url(),
                    config.microsoft_planner_container_url(),
                    Arc::new(tokens),
                )?);
                gateways.task_board = Some(planner.clone());
                gateways.directory = Some(planner);
            }
            _ => warn!("Microsoft credentials are incomplete, task board sync is disabled"),
        }

        match config.supabase_url() {
            Some(url) => {
                gateways.identity = Some(Arc::new(SupabaseVerifier::new(
                    &url,
                    config.supabase_api_key(),
                )?));
            }
            None => warn!("SUPABASE_URL is not set, authenticated routes are unavailable"),
        }

        Ok(gateways)
    }

    /// Checks the analysis provider's credentials with a lightweight request.
    /// Returns false, after logging why, when they are rejected or cannot be checked.
    /// Nothing is checked when no analysis provider is configured.
    pub async fn verify_analysis_credentials(&self) -> bool {
        let Some(analysis) = self.analysis.as_deref() else {
            return true;
        };

        match analysis.verify_credentials().await {
            Ok(true) => {
                info!("{} credentials verified", analysis.provider_id());
                true
            }
            Ok(false) => {
                warn!("{} rejected the configured credentials", analysis.provider_id());
                false
            }
            Err(e) => {
                warn!("Could not verify {} credentials: {e}", analysis.provider_id());
                false
            }
        }
    }
}

/// Maps a non-success response to the provider error for its status.
pub(crate) fn status_error(
    service: &str,
    status: StatusCode,
    retry_after: Option<u64>,
    body: String,
) -> MeetingAiError {
    error!("{service} returned {status}: {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            MeetingAiError::Authentication(format!("{service} returned {status}: {body}"))
        }
        StatusCode::NOT_FOUND => MeetingAiError::NotFound(format!("{service}: {body}")),
        StatusCode::TOO_MANY_REQUESTS => MeetingAiError::RateLimited {
            retry_after_seconds: retry_after.unwrap_or(60),
        },
        _ => MeetingAiError::Provider(format!("{service} returned {status}: {body}")),
    }
}

/// Reads the error body of a failed response and maps it with [`status_error`].
pub(crate) async fn response_error(service: &str, response: reqwest::Response) -> MeetingAiError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let error_text = response.text().await.unwrap_or_default();
    status_error(service, status, retry_after, error_text)
}

pub(crate) fn network_error(service: &str, err: reqwest::Error) -> MeetingAiError {
    warn!("Failed to reach {service}: {err:?}");
    MeetingAiError::Network(format!("{service}: {err}"))
}
