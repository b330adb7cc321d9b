//! API key authentication for service providers.
//!
//! Provides traits and implementations for authenticating requests to services
//! that use API keys or bearer tokens (Gemini, Supabase, Microsoft Graph).

mod auth;
mod bearer;

pub use auth::{ApiKeyAuth, ApiKeyProvider, AuthMethod, ProviderAuth};
pub use bearer::BearerTokenAuth;
