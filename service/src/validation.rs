//! Validation of [`Listing`]s before they are written.

use common::{
    operations::{By, Select},
    Amount,
};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::{
    domain::{
        crop_type,
        listing::{self, Descriptor, Field, InvalidField, Listing},
        parcel, user, CropType, Parcel, Reference, User,
    },
    infra::{database, Database},
    read::listing::Relations,
};

/// [`Database`] resolving the entities a [`Listing`] may reference.
pub trait Directory:
    Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    > + Database<
        Select<By<Option<CropType>, crop_type::Id>>,
        Ok = Option<CropType>,
        Err = Traced<database::Error>,
    > + Database<
        Select<By<Option<Parcel>, parcel::Id>>,
        Ok = Option<Parcel>,
        Err = Traced<database::Error>,
    >
{
}

impl<T> Directory for T where
    T: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<CropType>, crop_type::Id>>,
            Ok = Option<CropType>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Parcel>, parcel::Id>>,
            Ok = Option<Parcel>,
            Err = Traced<database::Error>,
        >
{
}

/// Validates the provided [`Amount`] as a [`listing::Quantity`] of a `K`
/// listing.
///
/// # Errors
///
/// If the [`Amount`] is not positive.
pub fn quantity<K: Descriptor>(
    amount: Amount,
) -> Result<listing::Quantity, Error> {
    listing::Quantity::new(amount)
        .ok_or(Error::InvalidField(non_positive(K::KIND, Field::Quantity)))
}

/// Validates the provided [`Amount`] as a [`listing::UnitPrice`] of a `K`
/// listing.
///
/// # Errors
///
/// If the [`Amount`] is not positive.
pub fn unit_price<K: Descriptor>(
    amount: Amount,
) -> Result<listing::UnitPrice, Error> {
    listing::UnitPrice::new(amount)
        .ok_or(Error::InvalidField(non_positive(K::KIND, Field::UnitPrice)))
}

/// Validates the references of the provided [`Listing`], resolving them into
/// its [`Relations`].
///
/// References are resolved in the order: [`User`], [`CropType`], [`Parcel`].
/// The first unresolved one is reported.
///
/// # Errors
///
/// - If the [`Listing`] has no [`Parcel`], while its kind requires one, or
///   vice versa.
/// - If any of the referenced entities doesn't exist.
/// - If the [`Directory`] fails.
pub async fn resolve<K, Db>(
    db: &Db,
    listing: &Listing<K>,
) -> Result<Relations, Traced<Error>>
where
    K: Descriptor,
    Db: Directory,
{
    use Error as E;

    match (K::HAS_PARCEL, listing.parcel_id) {
        (true, None) => {
            return Err(tracerr::new!(E::MissingField(Field::Parcel)));
        }
        (false, Some(_)) => {
            return Err(tracerr::new!(E::UnexpectedField(Field::Parcel)));
        }
        (true, Some(_)) | (false, None) => {}
    }

    let user = db
        .execute(Select(By::<Option<User>, _>::new(listing.user_id)))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?
        .ok_or(E::UnresolvedReference(listing.user_id.into()))
        .map_err(tracerr::wrap!())?;

    let crop_type = db
        .execute(Select(By::<Option<CropType>, _>::new(listing.crop_type_id)))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?
        .ok_or(E::UnresolvedReference(listing.crop_type_id.into()))
        .map_err(tracerr::wrap!())?;

    let parcel = if let Some(id) = listing.parcel_id {
        Some(
            db.execute(Select(By::<Option<Parcel>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UnresolvedReference(id.into()))
                .map_err(tracerr::wrap!())?,
        )
    } else {
        None
    };

    Ok(Relations {
        user: Some(user),
        crop_type: Some(crop_type),
        parcel,
    })
}

/// Creates an [`InvalidField`] for a non-positive amount.
const fn non_positive(kind: listing::Kind, field: Field) -> InvalidField {
    InvalidField {
        kind,
        field,
        reason: "must be positive",
    }
}

/// Error of [`Listing`] validation.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Field`] holds an out-of-range value.
    #[display("Invalid field: {_0}")]
    InvalidField(InvalidField),

    /// Required [`Field`] is absent.
    #[display("`{_0}` is required")]
    #[from(ignore)]
    MissingField(#[error(not(source))] Field),

    /// [`Field`] is present while not applicable to the [`Listing`] kind.
    #[display("`{_0}` is not applicable")]
    #[from(ignore)]
    UnexpectedField(#[error(not(source))] Field),

    /// Referenced entity doesn't exist.
    #[display("{_0} does not exist")]
    UnresolvedReference(#[error(not(source))] Reference),
}

#[cfg(test)]
mod spec {
    use common::Amount;

    use crate::domain::listing::{Field, Kind, Prefinancing, Purchase, Sale};

    use super::Error;

    #[test]
    fn amounts_must_be_positive() {
        let amount = |s: &str| s.parse::<Amount>().unwrap();

        assert!(super::quantity::<Sale>(amount("12.5")).is_ok());
        assert!(super::unit_price::<Purchase>(amount("300")).is_ok());

        assert!(matches!(
            super::quantity::<Sale>(Amount::ZERO),
            Err(Error::InvalidField(f))
                if f.field == Field::Quantity && f.kind == Kind::Sale,
        ));
        assert!(matches!(
            super::unit_price::<Prefinancing>(amount("-1")),
            Err(Error::InvalidField(f))
                if f.field == Field::UnitPrice && f.kind == Kind::Prefinancing,
        ));
    }
}
