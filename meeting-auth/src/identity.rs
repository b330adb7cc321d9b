//! Inbound bearer token verification.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api_key::{ApiKeyAuth, ApiKeyProvider, ProviderAuth};
use crate::error::{identity_error, Error, ErrorKind, IdentityErrorKind};

/// The caller a bearer token was issued to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthenticatedSubject {
    /// Identity provider's unique user identifier.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Verifies bearer tokens presented by API callers.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve the subject of `bearer_token`, rejecting missing, expired or
    /// forged tokens with `IdentityErrorKind::InvalidToken`.
    async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedSubject, Error>;
}

/// Verifies tokens against the Supabase Auth `/auth/v1/user` endpoint.
pub struct SupabaseVerifier {
    client: reqwest::Client,
    base_url: String,
    auth: ApiKeyAuth,
}

impl SupabaseVerifier {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, Error> {
        let auth = ApiKeyAuth::from_config(ApiKeyProvider::Supabase, api_key)?;
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseVerifier {
    async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedSubject, Error> {
        if bearer_token.trim().is_empty() {
            return Err(identity_error(
                IdentityErrorKind::MissingToken,
                "no bearer token supplied",
            ));
        }

        let url = format!("{}/auth/v1/user", self.base_url);
        debug!(%url, "Verifying bearer token");

        let response = self
            .auth
            .authenticate(self.client.get(&url))
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to reach identity provider");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Identity(IdentityErrorKind::Network),
                }
            })?;

        match response.status() {
            status if status.is_success() => response.json().await.map_err(|e| {
                warn!(error = %e, "Failed to parse identity provider user");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Identity(IdentityErrorKind::InvalidResponse),
                }
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Identity provider rejected bearer token");
                Err(identity_error(
                    IdentityErrorKind::InvalidToken,
                    "invalid or expired bearer token",
                ))
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                warn!(%status, "Unexpected identity provider response");
                Err(identity_error(
                    IdentityErrorKind::InvalidResponse,
                    &format!("{status}: {error_text}"),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_valid_token_resolves_subject() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/v1/user")
            .match_header("apikey", "anon")
            .match_header("authorization", "Bearer user-jwt")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"5f0c3c1e-2d7b-4b7e-9a59-0f2f5d3c9a10","email":"ada@example.com","role":"authenticated"}"#)
            .create_async()
            .await;

        let verifier = SupabaseVerifier::new(&server.url(), Some("anon".to_string())).unwrap();
        let subject = verifier.verify("user-jwt").await.unwrap();

        assert_eq!(subject.id, "5f0c3c1e-2d7b-4b7e-9a59-0f2f5d3c9a10");
        assert_eq!(subject.email.as_deref(), Some("ada@example.com"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_token_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/v1/user")
            .with_status(401)
            .with_body(r#"{"msg":"invalid JWT"}"#)
            .create_async()
            .await;

        let verifier = SupabaseVerifier::new(&server.url(), Some("anon".to_string())).unwrap();
        let result = verifier.verify("expired").await;

        assert_eq!(
            result.err().map(|e| e.error_kind),
            Some(ErrorKind::Identity(IdentityErrorKind::InvalidToken))
        );
    }

    #[tokio::test]
    async fn test_blank_token_is_missing() {
        let verifier = SupabaseVerifier::new("http://localhost", Some("anon".to_string())).unwrap();
        let result = verifier.verify(" ").await;

        assert_eq!(
            result.err().map(|e| e.error_kind),
            Some(ErrorKind::Identity(IdentityErrorKind::MissingToken))
        );
    }
}
