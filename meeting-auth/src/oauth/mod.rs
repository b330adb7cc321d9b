//! OAuth 2.0 client credentials tokens for app-only service access.

mod client_credentials;

pub mod token;

pub use client_credentials::{ClientCredentials, TokenSource, MICROSOFT_GRAPH_SCOPE};
