//! [`Command`] for updating an existing [`Listing`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    Amount,
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

/// [`Command`] for updating an existing [`Listing`] of the `K` kind.
///
/// Only the provided fields are changed, while the omitted ones ([`None`])
/// keep their current values.
#[derive(Clone, Debug)]
pub struct UpdateListing<K: Descriptor> {
    /// ID of the [`Listing`] to update.
    pub id: listing::Id,

    /// New owner of the [`Listing`].
    pub user_id: Option<user::Id>,

    /// New [`CropType`] of the [`Listing`].
    ///
    /// [`CropType`]: crate::domain::CropType
    pub crop_type_id: Option<crop_type::Id>,

    /// New [`Parcel`] of the [`Listing`].
    ///
    /// [`Parcel`]: crate::domain::Parcel
    pub parcel_id: Option<parcel::Id>,

    /// New [`listing::Status`].
    pub status: Option<listing::Status>,

    /// New [`listing::Description`].
    pub description: Option<listing::Description>,

    /// New quantity.
    pub quantity: Option<Amount>,

    /// New price per kilogram.
    pub unit_price: Option<Amount>,

    /// Changes of the kind-specific attributes.
    pub patch: K::Patch,
}

impl<K: Descriptor> UpdateListing<K> {
    /// Creates a new [`UpdateListing`] changing nothing.
    #[must_use]
    pub fn new(id: listing::Id) -> Self {
        Self {
            id,
            user_id: None,
            crop_type_id: None,
            parcel_id: None,
            status: None,
            description: None,
            quantity: None,
            unit_price: None,
            patch: K::Patch::default(),
        }
    }
}

impl<Db, K> Command<UpdateListing<K>> for Service<Db>
where
    K: Descriptor,
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Directory
        + Database<
            Select<By<Option<Listing<K>>, listing::Id>>,
            Ok = Option<Listing<K>>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Listing<K>>,
            Ok = bool,
            Err = Traced<database::Error>,
        >
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = View<K>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateListing<K>,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateListing {
            id,
            user_id,
            crop_type_id,
            parcel_id,
            status,
            description,
            quantity,
            unit_price,
            patch,
        } = cmd;

        let quantity = quantity
            .map(validation::quantity::<K>)
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let unit_price = unit_price
            .map(validation::unit_price::<K>)
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing<K>>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotExists(id))
            .map_err(tracerr::wrap!())?;

        if let Some(user_id) = user_id {
            listing.user_id = user_id;
        }
        if let Some(crop_type_id) = crop_type_id {
            listing.crop_type_id = crop_type_id;
        }
        if let Some(parcel_id) = parcel_id {
            listing.parcel_id = Some(parcel_id);
        }
        if let Some(status) = status {
            listing.status = status;
        }
        if let Some(description) = description {
            listing.description = description;
        }
        if let Some(quantity) = quantity {
            listing.quantity = quantity;
        }
        if let Some(unit_price) = unit_price {
            listing.unit_price = unit_price;
        }
        K::apply(&mut listing.attributes, patch);
        K::derive(&mut listing)
            .map_err(validation::Error::from)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        // The merged `Listing` is validated as a whole, so the references it
        // kept from before must still resolve.
        let relations = validation::resolve(&tx, &listing)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let updated = tx
            .execute(Update(listing))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !updated {
            return Err(tracerr::new!(E::NotExists(id)));
        }

        let listing = tx
            .execute(Select(By::<Option<Listing<K>>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotExists(id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(
            listing.kind = %K::KIND,
            listing.id = %id,
            "listing updated",
        );

        Ok(View { listing, relations })
    }
}

/// Error of [`UpdateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Updated [`Listing`] is invalid.
    #[display("`Listing` is invalid: {_0}")]
    Invalid(validation::Error),

    /// [`Listing`] doesn't exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    NotExists(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use common::{Amount, Handler as _};

    use crate::{
        command::{
            fixture::{self, amount, CASSAVA, FIELD, MAIZE},
            CreateListing,
        },
        domain::{
            crop_type,
            listing::{self, sale, Field, Prefinancing, Sale},
            parcel, user,
        },
        infra::{memory, Memory},
        query, validation, Service,
    };

    use super::{ExecutionError, UpdateListing};

    async fn create<K: memory::Rows>(
        svc: &Service<Memory>,
        patch: K::Patch,
    ) -> listing::Id {
        svc.execute(CreateListing::<K> {
            user_id: user::Id::from(fixture::ALICE),
            crop_type_id: crop_type::Id::from(MAIZE),
            parcel_id: Some(parcel::Id::from(FIELD)),
            status: listing::Status::new("disponible").unwrap(),
            description: listing::Description::new("Récolte 2024").unwrap(),
            quantity: amount("10"),
            unit_price: amount("25.5"),
            patch,
        })
        .await
        .unwrap()
        .listing
        .id
    }

    #[tokio::test]
    async fn keeps_omitted_fields() {
        let svc = fixture::service();
        let id =
            create::<Sale>(&svc, sale::Photo::new("/static/a.jpg")).await;

        let mut cmd = UpdateListing::<Sale>::new(id);
        cmd.status = listing::Status::new("vendu");
        cmd.crop_type_id = Some(crop_type::Id::from(CASSAVA));
        let view = svc.execute(cmd).await.unwrap();

        assert_eq!(view.listing.status.to_string(), "vendu");
        assert_eq!(view.listing.description.to_string(), "Récolte 2024");
        assert_eq!(view.listing.quantity.amount(), amount("10"));
        assert_eq!(
            view.listing.attributes.photo.map(|p| p.to_string()),
            Some("/static/a.jpg".to_owned()),
        );
        assert_eq!(view.relations.crop_type.unwrap().label.to_string(), "Manioc");
    }

    #[tokio::test]
    async fn empty_update_changes_nothing() {
        let svc = fixture::service();
        let id = create::<Sale>(&svc, None).await;

        let before = svc
            .execute(query::listing::ById::<Sale>::by(id))
            .await
            .unwrap()
            .unwrap();
        let after = svc.execute(UpdateListing::<Sale>::new(id)).await.unwrap();

        assert_eq!(after.listing.status, before.listing.status);
        assert_eq!(after.listing.unit_price, before.listing.unit_price);
        assert_eq!(after.listing.created_at, before.listing.created_at);
    }

    #[tokio::test]
    async fn recomputes_financed_amount() {
        let svc = fixture::service();
        let id = create::<Prefinancing>(&svc, ()).await;

        let mut cmd = UpdateListing::<Prefinancing>::new(id);
        cmd.quantity = Some(amount("20"));
        let view = svc.execute(cmd).await.unwrap();
        assert_eq!(
            view.listing.attributes.financed_amount.amount(),
            amount("510"),
        );

        let mut cmd = UpdateListing::<Prefinancing>::new(id);
        cmd.unit_price = Some(amount("10"));
        let view = svc.execute(cmd).await.unwrap();
        assert_eq!(
            view.listing.attributes.financed_amount.amount(),
            amount("200"),
        );
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let svc = fixture::service();
        let id = create::<Sale>(&svc, None).await;

        let mut cmd = UpdateListing::<Sale>::new(id);
        cmd.quantity = Some(Amount::ZERO);
        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::InvalidField(f))
                if f.field == Field::Quantity,
        ));

        let view = svc
            .execute(query::listing::ById::<Sale>::by(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.listing.quantity.amount(), amount("10"));
    }

    #[tokio::test]
    async fn rejects_unresolved_references() {
        let svc = fixture::service();
        let id = create::<Sale>(&svc, None).await;

        let mut cmd = UpdateListing::<Sale>::new(id);
        cmd.user_id = Some(user::Id::from(404));
        cmd.status = listing::Status::new("vendu");
        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(validation::Error::UnresolvedReference(_)),
        ));

        let view = svc
            .execute(query::listing::ById::<Sale>::by(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.listing.status.to_string(), "disponible");
    }

    #[tokio::test]
    async fn fails_on_unknown_listing() {
        let svc = fixture::service();

        let id = listing::Id::new();
        let err = svc.execute(UpdateListing::<Sale>::new(id)).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotExists(missing) if *missing == id,
        ));
    }
}
