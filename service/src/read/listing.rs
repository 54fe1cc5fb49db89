//! [`Listing`]-related read definitions.

use crate::domain::{
    listing::{self, Descriptor},
    CropType, Listing, Parcel, User,
};

/// [`Listing`] along with the entities it references, as displayed to
/// clients.
#[derive(Clone, Debug)]
pub struct View<K: Descriptor> {
    /// Viewed [`Listing`].
    pub listing: Listing<K>,

    /// [`Relations`] of the viewed [`Listing`].
    pub relations: Relations,
}

impl<K: Descriptor> View<K> {
    /// Returns the ID of the viewed [`Listing`].
    #[must_use]
    pub fn id(&self) -> listing::Id {
        self.listing.id
    }
}

/// Entities referenced by a [`Listing`].
///
/// Any of them may be missing if it has been removed after the [`Listing`]
/// was written.
#[derive(Clone, Debug, Default)]
pub struct Relations {
    /// [`User`] owning the [`Listing`].
    pub user: Option<User>,

    /// [`CropType`] of the [`Listing`].
    pub crop_type: Option<CropType>,

    /// [`Parcel`] of the [`Listing`].
    pub parcel: Option<Parcel>,
}

pub mod list {
    //! [`Listing`] list definitions.

    use crate::domain::{crop_type, listing, user};
    #[cfg(doc)]
    use crate::domain::Listing;

    /// Filter of a [`Listing`] list.
    ///
    /// All the specified criteria must match. An empty [`Filter`] matches
    /// every [`Listing`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the owning [`User`] to match.
        ///
        /// [`User`]: crate::domain::User
        pub user_id: Option<user::Id>,

        /// [`listing::Status`] to match exactly.
        pub status: Option<listing::Status>,

        /// ID of the [`CropType`] to match.
        ///
        /// [`CropType`]: crate::domain::CropType
        pub crop_type_id: Option<crop_type::Id>,
    }

    impl Filter {
        /// Checks whether the provided [`Listing`] matches this [`Filter`].
        #[must_use]
        pub fn matches<K: listing::Descriptor>(
            &self,
            listing: &listing::Listing<K>,
        ) -> bool {
            self.user_id.is_none_or(|id| id == listing.user_id)
                && self.status.as_ref().is_none_or(|s| *s == listing.status)
                && self
                    .crop_type_id
                    .is_none_or(|id| id == listing.crop_type_id)
        }
    }
}
