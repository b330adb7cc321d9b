//! # meeting-auth
//!
//! Single source of truth for authentication against the services the meeting
//! task pipeline talks to:
//! - API key authentication for service providers (Gemini, Supabase)
//! - OAuth 2.0 client credentials tokens for Microsoft Graph
//! - Bearer token identity verification for inbound requests
//! - HTTP client building with middleware
//!
//! ## Architecture
//!
//! This crate provides the authentication foundation that other crates build upon:
//! - `domain` gateways use API key auth and the Graph token source for outbound calls
//! - `web` uses the identity verifier to authenticate callers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meeting_auth::{
//!     api_key::{ApiKeyAuth, ApiKeyProvider, ProviderAuth},
//!     identity::{IdentityVerifier, SupabaseVerifier},
//!     oauth::{ClientCredentials, TokenSource},
//! };
//! ```

pub mod api_key;
pub mod error;
pub mod http;
pub mod identity;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
