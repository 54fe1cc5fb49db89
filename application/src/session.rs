//! [`Session`]-related definitions.

use axum::{
    async_trait, extract::FromRequestParts, Extension, RequestPartsExt as _,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::{session, user},
};

use crate::{define_error, AsError, Error, Service};

/// Session of the actor performing the current HTTP request.
///
/// Extracting it guards a handler: the request is rejected unless it carries
/// a valid bearer token.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// ID of the [`User`] performing the request.
    ///
    /// [`User`]: service::domain::User
    pub user_id: user::Id,

    /// ID of the profile the [`User`] acts with.
    ///
    /// [`User`]: service::domain::User
    pub profile_id: user::ProfileId,

    /// [`DateTime`] when this [`Session`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: session::ExpirationDateTime,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Extension(service) = parts
            .extract::<Extension<Service>>()
            .await
            .map_err(|e| Error::internal(&e))?;

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    AuthError::CredentialRequired
                } else {
                    AuthError::CredentialMalformed
                }
            })?;

        let session = service
            .execute(command::AuthorizeSession {
                token: bearer.token().to_owned().into(),
            })
            .await
            .map_err(AsError::into_error)?;

        _ = tracing::Span::current().record(
            "session.user_id",
            tracing::field::display(session.user_id),
        );

        Ok(Self {
            user_id: session.user_id,
            profile_id: session.profile_id,
            expires_at: session.expires_at,
        })
    }
}

impl AsError for command::authorize_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Malformed(_) => Some(AuthError::CredentialMalformed.into()),
            Self::Invalid(_) => Some(AuthError::CredentialInvalid.into()),
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "CREDENTIAL_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Token requis"]
        CredentialRequired,

        #[code = "CREDENTIAL_MALFORMED"]
        #[status = UNAUTHORIZED]
        #[message = "Format de token invalide"]
        CredentialMalformed,

        #[code = "CREDENTIAL_INVALID"]
        #[status = FORBIDDEN]
        #[message = "Token invalide"]
        CredentialInvalid,
    }
}
