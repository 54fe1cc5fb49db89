//! [`CropType`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of crop being traded (maize, cassava, cocoa, etc).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CropType {
    /// ID of this [`CropType`].
    pub id: Id,

    /// [`Label`] of this [`CropType`].
    pub label: Label,
}

/// ID of a [`CropType`].
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
    #[doc = "Human-readable label of a [`CropType`]."]
    pub struct Label(check = super::text::is_label);
}
