use crate::{AppState, Error};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};
use domain::identity::{self, Caller};
use log::*;

const BEARER_PREFIX: &str = "Bearer ";

/// The verified caller behind the request's `Authorization: Bearer` header.
pub(crate) struct AuthenticatedCaller(pub Caller);

impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            debug!("Rejecting request to {} without a bearer token", parts.uri);
            Error::from(DomainError {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Unauthenticated),
            })
        })?;

        let caller = identity::authenticate(state.gateways.identity.as_deref(), token).await?;
        Ok(AuthenticatedCaller(caller))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
