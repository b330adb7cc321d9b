//! API key authentication trait and implementation.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{api_key_error, ApiKeyErrorKind, Error};

/// Known API key providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyProvider {
    Gemini,
    Supabase,
    MicrosoftGraph,
}

impl ApiKeyProvider {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyProvider::Gemini => "gemini",
            ApiKeyProvider::Supabase => "supabase",
            ApiKeyProvider::MicrosoftGraph => "microsoft_graph",
        }
    }
}

/// Authentication method for HTTP requests.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMethod {
    /// Custom header carrying the raw key (e.g., "x-goog-api-key: xxx")
    ApiKeyHeader { header_name: String },
    /// Standard Bearer token
    BearerToken,
}

/// Trait for authenticating HTTP requests with API keys or bearer tokens.
///
/// Implementations handle provider-specific authentication patterns like:
/// - Gemini: `x-goog-api-key: xxx`
/// - Supabase: `apikey: xxx`
/// - Microsoft Graph: `Authorization: Bearer xxx`
pub trait ProviderAuth: Send + Sync {
    /// Get the provider identifier.
    fn provider(&self) -> ApiKeyProvider;

    /// Get the authentication method used by this provider.
    fn auth_method(&self) -> AuthMethod;

    /// Apply authentication to a request builder.
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder;
}

/// API key authentication implementation.
///
/// The header name is fixed per provider.
///
/// # Examples
///
/// ```rust,ignore
/// // Gemini: x-goog-api-key: xxx
/// let auth = ApiKeyAuth::new(ApiKeyProvider::Gemini, SecretString::from("api_key_here".to_string()));
/// ```
pub struct ApiKeyAuth {
    provider: ApiKeyProvider,
    api_key: SecretString,
    header_name: String,
}

impl ApiKeyAuth {
    /// Create a new API key authenticator.
    pub fn new(provider: ApiKeyProvider, api_key: SecretString) -> Self {
        let header_name = match provider {
            ApiKeyProvider::Gemini => "x-goog-api-key",
            ApiKeyProvider::Supabase => "apikey",
            ApiKeyProvider::MicrosoftGraph => "Authorization",
        };

        Self {
            provider,
            api_key,
            header_name: header_name.to_string(),
        }
    }

    /// Create an authenticator from an optionally configured key.
    ///
    /// Fails with `ApiKeyErrorKind::NotFound` when the key is absent and
    /// `ApiKeyErrorKind::InvalidFormat` when it is blank.
    pub fn from_config(provider: ApiKeyProvider, api_key: Option<String>) -> Result<Self, Error> {
        match api_key {
            None => Err(api_key_error(
                ApiKeyErrorKind::NotFound,
                &format!("no API key configured for {}", provider.as_str()),
            )),
            Some(key) if key.trim().is_empty() => Err(api_key_error(
                ApiKeyErrorKind::InvalidFormat,
                &format!("blank API key configured for {}", provider.as_str()),
            )),
            Some(key) => Ok(Self::new(provider, SecretString::from(key))),
        }
    }

    /// Get a reference to the API key.
    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

impl ProviderAuth for ApiKeyAuth {
    fn provider(&self) -> ApiKeyProvider {
        self.provider
    }

    fn auth_method(&self) -> AuthMethod {
        AuthMethod::ApiKeyHeader {
            header_name: self.header_name.clone(),
        }
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(&self.header_name, self.api_key.expose_secret())
    }
}
