//! OAuth 2.0 client credentials grant with an in-memory token cache.

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::token::{TokenResponse, Tokens};
use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind};
use crate::http::{AuthenticatedClient, AuthenticatedClientBuilder};

/// App-only scope covering every Graph permission granted to the app registration.
pub const MICROSOFT_GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Source of bearer tokens for outbound service calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a currently valid access token, fetching a new one if needed.
    async fn access_token(&self) -> Result<SecretString, Error>;
}

/// Client credentials token source.
///
/// Tokens are cached until five minutes before expiry. Concurrent callers
/// share a single in-flight fetch.
pub struct ClientCredentials {
    client: AuthenticatedClient,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    scope: String,
    cached: Mutex<Option<Tokens>>,
}

impl ClientCredentials {
    pub fn new(
        client: AuthenticatedClient,
        token_url: String,
        client_id: String,
        client_secret: SecretString,
        scope: String,
    ) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
            scope,
            cached: Mutex::new(None),
        }
    }

    /// Token source for the Microsoft identity platform v2 endpoint of `tenant_id`.
    pub fn microsoft(
        login_base_url: &str,
        tenant_id: &str,
        client_id: String,
        client_secret: SecretString,
    ) -> Result<Self, Error> {
        let client = AuthenticatedClientBuilder::new().build()?;
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            login_base_url.trim_end_matches('/'),
            tenant_id
        );

        Ok(Self::new(
            client,
            token_url,
            client_id,
            client_secret,
            MICROSOFT_GRAPH_SCOPE.to_string(),
        ))
    }

    async fn fetch(&self) -> Result<Tokens, Error> {
        debug!(token_url = %self.token_url, "Requesting client credentials token");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to reach token endpoint");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::OAuth(OAuthErrorKind::Network),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, "Token endpoint rejected client credentials");
            return Err(oauth_error(
                OAuthErrorKind::TokenExchangeFailed,
                &format!("{status}: {error_text}"),
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse token response");
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })?;

        Ok(Tokens::from_response(body, Utc::now()))
    }
}

#[async_trait]
impl TokenSource for ClientCredentials {
    async fn access_token(&self) -> Result<SecretString, Error> {
        let mut cached = self.cached.lock().await;

        if let Some(tokens) = cached.as_ref().filter(|tokens| !tokens.is_expired()) {
            return Ok(tokens.access_token.clone());
        }

        let tokens = self.fetch().await?;
        let access_token = tokens.access_token.clone();
        *cached = Some(tokens);

        Ok(access_token)
    }
}
