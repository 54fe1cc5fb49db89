//! [`Session`] definitions.

use std::fmt;

use common::{unit, DateTimeOf};
use derive_more::{AsRef, From};
use serde::{de, Deserialize, Deserializer};

use super::user;

/// Authenticated session of a [`User`], carried by a bearer [`Token`].
///
/// [`User`]: super::User
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    ///
    /// [`User`]: super::User
    #[serde(deserialize_with = "integral")]
    pub user_id: user::Id,

    /// ID of the profile the [`User`] acts with.
    ///
    /// [`User`]: super::User
    #[serde(rename = "profil_id", deserialize_with = "integral")]
    pub profile_id: user::ProfileId,

    /// [`DateTime`] when this [`Session`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Bearer token of a [`Session`].
#[derive(AsRef, Clone, Debug, From)]
#[as_ref(str)]
pub struct Token(String);

/// [`DateTime`] when a [`Session`] expires.
///
/// [`DateTime`]: common::DateTime
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

/// Deserializes an integral claim, written either as an integer or as a float
/// without fractional part (`42` or `42.0`).
fn integral<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<i64>,
{
    deserializer.deserialize_any(IntegralVisitor).map(T::from)
}

/// [`de::Visitor`] of integral claims.
struct IntegralVisitor;

impl de::Visitor<'_> for IntegralVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom(format!("`{v}` is too large")))
    }

    #[expect(clippy::cast_possible_truncation, reason = "checked")]
    #[expect(clippy::float_cmp, reason = "exact check")]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        let int = v.trunc();
        if int != v || !(-9.0e15..=9.0e15).contains(&int) {
            return Err(E::custom(format!("`{v}` is not an integer")));
        }
        Ok(int as i64)
    }
}
