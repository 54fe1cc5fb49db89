//! [`Parcel`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plot of land the listed crop is grown on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parcel {
    /// ID of this [`Parcel`].
    pub id: Id,

    /// [`Address`] of this [`Parcel`].
    pub address: Address,

    /// [`Surface`] of this [`Parcel`].
    pub surface: Surface,
}

/// ID of a [`Parcel`].
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
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(Uuid);

define_text! {
    #[doc = "Address (location) of a [`Parcel`]."]
    pub struct Address(check = super::text::is_free_text);
}

define_text! {
    #[doc = "Surface of a [`Parcel`], as entered by its owner (`2 ha`, etc)."]
    pub struct Surface(check = super::text::is_free_text);
}
