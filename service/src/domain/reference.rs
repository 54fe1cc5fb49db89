//! [`Reference`] definitions.

use common::define_kind;
use derive_more::{Display, From};

use super::{crop_type, parcel, user};

/// Reference from a listing to another entity.
#[derive(Clone, Copy, Debug, Display, Eq, From, PartialEq)]
pub enum Reference {
    /// Reference to a [`User`].
    ///
    /// [`User`]: super::User
    #[display("`User(id: {_0})`")]
    User(user::Id),

    /// Reference to a [`CropType`].
    ///
    /// [`CropType`]: super::CropType
    #[display("`CropType(id: {_0})`")]
    CropType(crop_type::Id),

    /// Reference to a [`Parcel`].
    ///
    /// [`Parcel`]: super::Parcel
    #[display("`Parcel(id: {_0})`")]
    Parcel(parcel::Id),
}

impl Reference {
    /// Returns the [`Kind`] of this [`Reference`].
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::User(_) => Kind::User,
            Self::CropType(_) => Kind::CropType,
            Self::Parcel(_) => Kind::Parcel,
        }
    }
}

define_kind! {
    #[doc = "Kind of a [`Reference`]."]
    enum Kind {
        #[doc = "Reference to a [`User`](super::User)."]
        User = 1,

        #[doc = "Reference to a [`CropType`](super::CropType)."]
        CropType = 2,

        #[doc = "Reference to a [`Parcel`](super::Parcel)."]
        Parcel = 3,
    }
}
