//! [`Command`] for creating a new [`Listing`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    Amount, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        crop_type,
        listing::{self, Descriptor},
        parcel, user, Listing,
    },
    infra::{database, Database},
    read::listing::View,
    validation::{self, Directory},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Listing`] of the `K` kind.
#[derive(Clone, Debug)]
pub struct CreateListing<K: Descriptor> {
    /// ID of the [`User`] owning the [`Listing`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the traded [`CropType`].
    ///
    /// [`CropType`]: crate::domain::CropType
    pub crop_type_id: crop_type::Id,

    /// ID of the [`Parcel`] the crop is grown on.
    ///
    /// [`Parcel`]: crate::domain::Parcel
    pub parcel_id: Option<parcel::Id>,

    /// [`listing::Status`] of the [`Listing`].
    pub status: listing::Status,

    /// [`listing::Description`] of the [`Listing`].
    pub description: listing::Description,

    /// Offered or requested quantity.
    pub quantity: Amount,

    /// Price of the crop per kilogram.
    pub unit_price: Amount,

    /// Kind-specific attributes.
    pub patch: K::Patch,
}

impl<Db, K> Command<CreateListing<K>> for Service<Db>
where
    K: Descriptor,
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Directory
        + Database<Insert<Listing<K>>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Listing<K>>, listing::Id>>,
            Ok = Option<Listing<K>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = View<K>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateListing<K>,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateListing {
            user_id,
            crop_type_id,
            parcel_id,
            status,
            description,
            quantity,
            unit_price,
            patch,
        } = cmd;

        let mut listing = Listing::<K> {
            id: listing::Id::new(),
            user_id,
            crop_type_id,
            parcel_id,
            status,
            description,
            quantity: validation::quantity::<K>(quantity)
                .map_err(tracerr::from_and_wrap!(=> E))?,
            unit_price: validation::unit_price::<K>(unit_price)
                .map_err(tracerr::from_and_wrap!(=> E))?,
            attributes: K::Attributes::default(),
            created_at: DateTime::now().coerce(),
        };
        K::apply(&mut listing.attributes, patch);
        K::derive(&mut listing)
            .map_err(validation::Error::from)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let relations = validation::resolve(&tx, &listing)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let id = listing.id;
        tx.execute(Insert(listing))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let listing = tx
            .execute(Select(By::<Option<Listing<K>>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotStored(id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(
            listing.kind = %K::KIND,
            listing.id = %id,
            user.id = %listing.user_id,
            "listing created",
        );

        Ok(View { listing, relations })
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] is invalid.
    #[display("`Listing` is invalid: {_0}")]
    Invalid(validation::Error),

    /// Written [`Listing`] cannot be read back.
    #[display("`Listing(id: {_0})` is not stored")]
    #[from(ignore)]
    NotStored(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use common::{Amount, Handler as _};

    use crate::{
        command::fixture::{self, amount, CASSAVA, FIELD, MAIZE},
        domain::{
            crop_type,
            listing::{
                self, sale, Descriptor, Field, Prefinancing, Purchase, Sale,
            },
            parcel, reference, user,
        },
        query, validation,
    };

    use super::{CreateListing, ExecutionError};

    fn cmd<K: Descriptor>(
        parcel: Option<uuid::Uuid>,
        quantity: Amount,
        unit_price: Amount,
    ) -> CreateListing<K> {
        CreateListing {
            user_id: user::Id::from(fixture::ALICE),
            crop_type_id: crop_type::Id::from(MAIZE),
            parcel_id: parcel.map(parcel::Id::from),
            status: listing::Status::new("disponible").unwrap(),
            description: listing::Description::new("Maïs séché").unwrap(),
            quantity,
            unit_price,
            patch: K::Patch::default(),
        }
    }

    #[tokio::test]
    async fn creates_sale() {
        let svc = fixture::service();

        let mut cmd = cmd::<Sale>(Some(FIELD), amount("100"), amount("300"));
        cmd.patch = sale::Photo::new("/static/mais.jpg");
        let view = svc.execute(cmd).await.unwrap();

        assert_eq!(
            view.listing.attributes.photo.as_ref().map(AsRef::<str>::as_ref),
            Some("/static/mais.jpg"),
        );
        assert_eq!(view.relations.user.unwrap().name.to_string(), "Awa");
        assert_eq!(view.relations.crop_type.unwrap().label.to_string(), "Maïs");
        assert_eq!(view.relations.parcel.unwrap().surface.to_string(), "2 ha");

        let stored = svc
            .execute(query::listing::ById::<Sale>::by(view.listing.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.listing.quantity.amount(), amount("100"));
    }

    #[tokio::test]
    async fn creates_purchase_without_parcel() {
        let svc = fixture::service();

        let view = svc
            .execute(cmd::<Purchase>(None, amount("50"), amount("250")))
            .await
            .unwrap();

        assert!(view.listing.parcel_id.is_none());
        assert!(view.relations.parcel.is_none());
    }

    #[tokio::test]
    async fn derives_financed_amount() {
        let svc = fixture::service();

        let view = svc
            .execute(cmd::<Prefinancing>(
                Some(FIELD),
                amount("10"),
                amount("25.5"),
            ))
            .await
            .unwrap();

        assert_eq!(
            view.listing.attributes.financed_amount.amount(),
            amount("255"),
        );
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let svc = fixture::service();

        let err = svc
            .execute(cmd::<Sale>(Some(FIELD), Amount::ZERO, amount("300")))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::InvalidField(f))
                if f.field == Field::Quantity,
        ));

        let err = svc
            .execute(cmd::<Purchase>(None, amount("1"), amount("-300")))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::InvalidField(f))
                if f.field == Field::UnitPrice,
        ));

        let all = svc
            .execute(query::listing::List::<Sale>::by(Default::default()))
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn rejects_unresolved_references() {
        let svc = fixture::service();

        let mut unknown_user = cmd::<Sale>(Some(FIELD), amount("1"), amount("1"));
        unknown_user.user_id = user::Id::from(404);
        let err = svc.execute(unknown_user).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::UnresolvedReference(r))
                if r.kind() == reference::Kind::User,
        ));

        let mut unknown_crop = cmd::<Purchase>(None, amount("1"), amount("1"));
        unknown_crop.crop_type_id = crop_type::Id::from(uuid::Uuid::nil());
        let err = svc.execute(unknown_crop).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::UnresolvedReference(r))
                if r.kind() == reference::Kind::CropType,
        ));

        let unknown_parcel = cmd::<Prefinancing>(
            Some(uuid::Uuid::nil()),
            amount("1"),
            amount("1"),
        );
        let err = svc.execute(unknown_parcel).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::UnresolvedReference(r))
                if r.kind() == reference::Kind::Parcel,
        ));

        let all = svc
            .execute(query::listing::List::<Sale>::by(Default::default()))
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn checks_parcel_presence() {
        let svc = fixture::service();

        let err = svc
            .execute(cmd::<Sale>(None, amount("1"), amount("1")))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::MissingField(
                Field::Parcel
            )),
        ));

        let err = svc
            .execute(cmd::<Purchase>(Some(FIELD), amount("1"), amount("1")))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::UnexpectedField(
                Field::Parcel
            )),
        ));
    }

    #[tokio::test]
    async fn assigns_distinct_ids() {
        let svc = fixture::service();

        let first = svc
            .execute(cmd::<Purchase>(None, amount("1"), amount("1")))
            .await
            .unwrap();
        let mut second = cmd::<Purchase>(None, amount("1"), amount("1"));
        second.crop_type_id = crop_type::Id::from(CASSAVA);
        let second = svc.execute(second).await.unwrap();

        assert_ne!(first.listing.id, second.listing.id);
    }
}
