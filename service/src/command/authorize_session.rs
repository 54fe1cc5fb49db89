//! [`Command`] for authorizing a [`Session`].

use derive_more::{Display, Error};
use jsonwebtoken::{errors::ErrorKind, Algorithm, Validation};
use tracerr::Traced;

use crate::{
    domain::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`] by its bearer [`session::Token`].
///
/// Tokens are issued by the identity service and signed with `HS256`.
#[derive(Clone, Debug)]
pub struct AuthorizeSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeSession,
    ) -> Result<Self::Ok, Self::Err> {
        let AuthorizeSession { token } = cmd;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.leeway = 0;

        jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &validation,
        )
        .map(|data| data.claims)
        .map_err(ExecutionError::from)
        .map_err(tracerr::wrap!())
    }
}

/// Error of [`AuthorizeSession`] [`Command`] execution.
#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    /// Token cannot be parsed as a JSON Web Token with the expected claims.
    #[display("Malformed JSON Web Token: {_0}")]
    Malformed(jsonwebtoken::errors::Error),

    /// Token is well-formed, but its signature is wrong or it has expired.
    #[display("Invalid JSON Web Token: {_0}")]
    Invalid(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for ExecutionError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        if matches!(
            e.kind(),
            ErrorKind::InvalidSignature
                | ErrorKind::ExpiredSignature
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidAlgorithm
        ) {
            Self::Invalid(e)
        } else {
            Self::Malformed(e)
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{DateTime, Handler as _};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use crate::{
        command::fixture::{self, SECRET},
        domain::{session, user},
    };

    use super::{AuthorizeSession, ExecutionError};

    fn token(claims: &serde_json::Value, secret: &[u8]) -> session::Token {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
        .into()
    }

    fn in_an_hour() -> i64 {
        (DateTime::now() + Duration::from_secs(3600)).unix_timestamp()
    }

    #[tokio::test]
    async fn authorizes_valid_token() {
        let svc = fixture::service();

        let exp = in_an_hour();
        let session = svc
            .execute(AuthorizeSession {
                token: token(
                    &json!({"user_id": 7, "profil_id": 1, "exp": exp}),
                    SECRET,
                ),
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, user::Id::from(7));
        assert_eq!(session.profile_id, user::ProfileId::from(1));
        assert_eq!(session.expires_at.unix_timestamp(), exp);
    }

    #[tokio::test]
    async fn accepts_float_user_id() {
        let svc = fixture::service();

        let session = svc
            .execute(AuthorizeSession {
                token: token(
                    &json!({"user_id": 7.0, "profil_id": 1, "exp": in_an_hour()}),
                    SECRET,
                ),
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, user::Id::from(7));
    }

    #[tokio::test]
    async fn rejects_wrong_signature() {
        let svc = fixture::service();

        let err = svc
            .execute(AuthorizeSession {
                token: token(
                    &json!({"user_id": 7, "profil_id": 1, "exp": in_an_hour()}),
                    b"another-secret",
                ),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Invalid(_)));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let svc = fixture::service();

        let exp = (DateTime::now() - Duration::from_secs(3600)).unix_timestamp();
        let err = svc
            .execute(AuthorizeSession {
                token: token(
                    &json!({"user_id": 7, "profil_id": 1, "exp": exp}),
                    SECRET,
                ),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Invalid(_)));
    }

    #[tokio::test]
    async fn rejects_just_expired_token() {
        let svc = fixture::service();

        let exp = (DateTime::now() - Duration::from_secs(30)).unix_timestamp();
        let err = svc
            .execute(AuthorizeSession {
                token: token(
                    &json!({"user_id": 7, "profil_id": 1, "exp": exp}),
                    SECRET,
                ),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Invalid(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_token() {
        let svc = fixture::service();

        let err = svc
            .execute(AuthorizeSession {
                token: session::Token::from("not-a-jwt".to_owned()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::Malformed(_)));

        let err = svc
            .execute(AuthorizeSession {
                token: token(
                    &json!({"profil_id": 1, "exp": in_an_hour()}),
                    SECRET,
                ),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::Malformed(_)));
    }
}
