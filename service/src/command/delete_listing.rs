//! [`Command`] for deleting a [`Listing`].

use std::marker::PhantomData;

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Debug, Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, Descriptor},
        Listing,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Listing`] of the `K` kind.
#[derive(Clone, Copy, Debug)]
pub struct DeleteListing<K> {
    /// ID of the [`Listing`] to delete.
    pub id: listing::Id,

    /// Kind of the [`Listing`] to delete.
    #[debug(skip)]
    _kind: PhantomData<K>,
}

impl<K> DeleteListing<K> {
    /// Creates a new [`DeleteListing`] of the [`Listing`] with the provided
    /// [`listing::Id`].
    #[must_use]
    pub const fn new(id: listing::Id) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }
}

impl<Db, K> Command<DeleteListing<K>> for Service<Db>
where
    K: Descriptor,
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Listing<K>>, listing::Id>>,
            Ok = Option<Listing<K>>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Listing<K>, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteListing<K>,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteListing { id, .. } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<Listing<K>>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::NotExists(id))
                .map_err(tracerr::wrap!())?,
        );

        tx.execute(Delete(By::<Listing<K>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(
            listing.kind = %K::KIND,
            listing.id = %id,
            "listing deleted",
        );

        Ok(())
    }
}

/// Error of [`DeleteListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] doesn't exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    NotExists(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::{
            fixture::{self, amount, MAIZE},
            CreateListing,
        },
        domain::{
            crop_type,
            listing::{self, Purchase, Sale},
            user,
        },
        query,
    };

    use super::{DeleteListing, ExecutionError};

    #[tokio::test]
    async fn deletes_once() {
        let svc = fixture::service();
        let id = svc
            .execute(CreateListing::<Purchase> {
                user_id: user::Id::from(fixture::BOB),
                crop_type_id: crop_type::Id::from(MAIZE),
                parcel_id: None,
                status: listing::Status::new("ouvert").unwrap(),
                description: listing::Description::default(),
                quantity: amount("500"),
                unit_price: amount("200"),
                patch: (),
            })
            .await
            .unwrap()
            .listing
            .id;

        svc.execute(DeleteListing::<Purchase>::new(id)).await.unwrap();

        let found = svc
            .execute(query::listing::ById::<Purchase>::by(id))
            .await
            .unwrap();
        assert!(found.is_none());

        let err = svc
            .execute(DeleteListing::<Purchase>::new(id))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotExists(_)));
    }

    #[tokio::test]
    async fn does_not_cross_kinds() {
        let svc = fixture::service();
        let id = svc
            .execute(CreateListing::<Purchase> {
                user_id: user::Id::from(fixture::BOB),
                crop_type_id: crop_type::Id::from(MAIZE),
                parcel_id: None,
                status: listing::Status::new("ouvert").unwrap(),
                description: listing::Description::default(),
                quantity: amount("1"),
                unit_price: amount("1"),
                patch: (),
            })
            .await
            .unwrap()
            .listing
            .id;

        let err = svc.execute(DeleteListing::<Sale>::new(id)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotExists(_)));
        assert!(svc
            .execute(query::listing::ById::<Purchase>::by(id))
            .await
            .unwrap()
            .is_some());
    }
}
