//! Resolves the caller behind a bearer token.

use crate::error::Error;
use entity_api::Id;
use log::*;
use meeting_auth::identity::IdentityVerifier;

/// An authenticated API caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    /// Identity provider's user id.
    pub subject_id: String,
    pub email: Option<String>,
}

impl Caller {
    /// The caller as the host of a meeting they submit, when their id is a UUID.
    pub fn host_id(&self) -> Option<Id> {
        Id::parse_str(&self.subject_id).ok()
    }
}

pub async fn authenticate(
    verifier: Option<&dyn IdentityVerifier>,
    bearer_token: &str,
) -> Result<Caller, Error> {
    let verifier = verifier.ok_or_else(|| {
        error!("Bearer token received but no identity provider is configured");
        Error::config("identity provider is not configured")
    })?;

    let subject = verifier.verify(bearer_token).await?;
    debug!("Authenticated caller {}", subject.id);

    Ok(Caller {
        subject_id: subject.id,
        email: subject.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::test_support::MockIdentity;
    use meeting_auth::error::{identity_error, IdentityErrorKind};
    use meeting_auth::identity::AuthenticatedSubject;

    #[tokio::test]
    async fn verified_tokens_yield_the_caller() {
        let subject_id = Id::new_v4().to_string();
        let returned_id = subject_id.clone();
        let mut verifier = MockIdentity::new();
        verifier.expect_verify().returning(move |_| {
            Ok(AuthenticatedSubject {
                id: returned_id.clone(),
                email: Some("dana@example.com".to_string()),
            })
        });

        let caller = authenticate(Some(&verifier), "token").await.unwrap();

        assert_eq!(caller.subject_id, subject_id);
        assert!(caller.host_id().is_some());
    }

    #[tokio::test]
    async fn rejected_tokens_are_unauthenticated() {
        let mut verifier = MockIdentity::new();
        verifier
            .expect_verify()
            .returning(|_| Err(identity_error(IdentityErrorKind::InvalidToken, "expired")));

        let err = authenticate(Some(&verifier), "token").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn missing_verifier_is_a_config_error() {
        let err = authenticate(None, "token").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }

    #[test]
    fn non_uuid_subjects_have_no_host_id() {
        let caller = Caller {
            subject_id: "auth0|123".to_string(),
            email: None,
        };
        assert_eq!(caller.host_id(), None);
    }
}
