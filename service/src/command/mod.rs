//! [`Command`] definition.

pub mod authorize_session;
pub mod create_listing;
pub mod delete_listing;
pub mod update_listing;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_session::AuthorizeSession, create_listing::CreateListing,
    delete_listing::DeleteListing, update_listing::UpdateListing,
};

#[cfg(test)]
pub(crate) mod fixture {
    //! Shared fixtures of [`Command`] tests.

    use common::Amount;
    use jsonwebtoken::DecodingKey;
    use uuid::Uuid;

    use crate::{
        domain::{crop_type, parcel, user, CropType, Parcel, User},
        infra::Memory,
        Config, Service,
    };

    /// Secret signing session tokens in tests.
    pub(crate) const SECRET: &[u8] = b"test-secret";

    /// Existing [`User`].
    pub(crate) const ALICE: i64 = 7;

    /// Existing [`User`] owning no listings.
    pub(crate) const BOB: i64 = 8;

    /// Existing [`CropType`].
    pub(crate) const MAIZE: Uuid = Uuid::from_u128(0x11);

    /// Another existing [`CropType`].
    pub(crate) const CASSAVA: Uuid = Uuid::from_u128(0x12);

    /// Existing [`Parcel`].
    pub(crate) const FIELD: Uuid = Uuid::from_u128(0x21);

    /// Parses the provided string as an [`Amount`].
    pub(crate) fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    /// Creates a new [`Service`] over a seeded [`Memory`] database.
    pub(crate) fn service() -> Service<Memory> {
        let db = Memory::default();
        for (id, name) in [(ALICE, "Awa"), (BOB, "Kofi")] {
            db.put_user(User {
                id: user::Id::from(id),
                name: user::Name::new(name).unwrap(),
            });
        }
        for (id, label) in [(MAIZE, "Maïs"), (CASSAVA, "Manioc")] {
            db.put_crop_type(CropType {
                id: crop_type::Id::from(id),
                label: crop_type::Label::new(label).unwrap(),
            });
        }
        db.put_parcel(Parcel {
            id: parcel::Id::from(FIELD),
            address: parcel::Address::new("Route de Bouaké, km 12").unwrap(),
            surface: parcel::Surface::new("2 ha").unwrap(),
        });

        Service::new(
            Config {
                jwt_decoding_key: DecodingKey::from_secret(SECRET),
            },
            db,
        )
    }
}
