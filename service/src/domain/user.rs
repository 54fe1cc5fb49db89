//! [`User`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

/// Platform user owning listings.
///
/// Users are managed by an external identity service, so only the attributes
/// displayed along with listings are known here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,
}

/// ID of a [`User`].
///
/// Issued by the identity service as an integer.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(i64);

/// ID of a profile of a [`User`] (a farmer, a buyer, an investor, etc).
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct ProfileId(i64);

define_text! {
    #[doc = "Display name of a [`User`]."]
    pub struct Name(check = super::text::is_label);
}
