//! In-memory [`Database`] implementation.
//!
//! Writes are applied immediately, so [`Transact`] and [`Commit`] only
//! satisfy the operations' contract without providing any isolation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::operations::{
    By, Commit, Delete, Insert, Select, Transact, Update,
};
use tracerr::Traced;

use crate::{
    domain::{
        crop_type,
        listing::{self, Descriptor, Prefinancing, Purchase, Sale},
        parcel, user, CropType, Listing, Parcel, User,
    },
    read::listing::{list, Relations, View},
};

use super::{Database, Error};

/// In-memory [`Database`].
///
/// Clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<State>>);

impl Memory {
    /// Stores the provided [`User`], replacing the one with the same ID.
    pub fn put_user(&self, user: User) {
        drop(self.state().users.insert(user.id, user));
    }

    /// Stores the provided [`CropType`], replacing the one with the same ID.
    pub fn put_crop_type(&self, crop_type: CropType) {
        drop(self.state().crop_types.insert(crop_type.id, crop_type));
    }

    /// Stores the provided [`Parcel`], replacing the one with the same ID.
    pub fn put_parcel(&self, parcel: Parcel) {
        drop(self.state().parcels.insert(parcel.id, parcel));
    }

    /// Removes the [`CropType`] with the provided ID, if any.
    pub fn remove_crop_type(&self, id: crop_type::Id) {
        drop(self.state().crop_types.remove(&id));
    }

    /// Locks the [`State`] of this [`Memory`].
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Data stored in a [`Memory`] database.
#[derive(Debug, Default)]
pub struct State {
    /// Known [`User`]s.
    users: HashMap<user::Id, User>,

    /// Known [`CropType`]s.
    crop_types: HashMap<crop_type::Id, CropType>,

    /// Known [`Parcel`]s.
    parcels: HashMap<parcel::Id, Parcel>,

    /// [`Sale`] listings, in insertion order.
    sales: Vec<Listing<Sale>>,

    /// [`Purchase`] listings, in insertion order.
    purchases: Vec<Listing<Purchase>>,

    /// [`Prefinancing`] listings, in insertion order.
    prefinancings: Vec<Listing<Prefinancing>>,
}

impl State {
    /// Resolves the [`Relations`] of the provided [`Listing`].
    fn relations<K: Descriptor>(&self, listing: &Listing<K>) -> Relations {
        Relations {
            user: self.users.get(&listing.user_id).cloned(),
            crop_type: self.crop_types.get(&listing.crop_type_id).cloned(),
            parcel: listing
                .parcel_id
                .and_then(|id| self.parcels.get(&id).cloned()),
        }
    }
}

/// [`Descriptor`] of a [`Listing`] kind stored in a [`Memory`] database.
pub trait Rows: Descriptor {
    /// Returns the [`Listing`]s of this kind stored in the [`State`].
    fn rows(state: &mut State) -> &mut Vec<Listing<Self>>;
}

impl Rows for Sale {
    fn rows(state: &mut State) -> &mut Vec<Listing<Self>> {
        &mut state.sales
    }
}

impl Rows for Purchase {
    fn rows(state: &mut State) -> &mut Vec<Listing<Self>> {
        &mut state.purchases
    }
}

impl Rows for Prefinancing {
    fn rows(state: &mut State) -> &mut Vec<Listing<Self>> {
        &mut state.prefinancings
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().users.get(by.inner()).cloned())
    }
}

impl Database<Select<By<Option<CropType>, crop_type::Id>>> for Memory {
    type Ok = Option<CropType>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<CropType>, crop_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().crop_types.get(by.inner()).cloned())
    }
}

impl Database<Select<By<Option<Parcel>, parcel::Id>>> for Memory {
    type Ok = Option<Parcel>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Parcel>, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().parcels.get(by.inner()).cloned())
    }
}

impl<K: Rows> Database<Select<By<Option<Listing<K>>, listing::Id>>>
    for Memory
{
    type Ok = Option<Listing<K>>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing<K>>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(K::rows(&mut self.state())
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }
}

impl<K: Rows> Database<Insert<Listing<K>>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing<K>>,
    ) -> Result<Self::Ok, Self::Err> {
        K::rows(&mut self.state()).push(listing);
        Ok(())
    }
}

impl<K: Rows> Database<Update<Listing<K>>> for Memory {
    /// Whether the [`Listing`] existed and has been updated.
    type Ok = bool;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing<K>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        let Some(row) = K::rows(&mut state)
            .iter_mut()
            .find(|l| l.id == listing.id)
        else {
            return Ok(false);
        };
        *row = Listing {
            created_at: row.created_at,
            ..listing
        };
        Ok(true)
    }
}

impl<K: Rows> Database<Delete<By<Listing<K>, listing::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Listing<K>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        K::rows(&mut self.state()).retain(|l| l.id != id);
        Ok(())
    }
}

impl<K: Rows> Database<Select<By<Option<View<K>>, listing::Id>>>
    for Memory
{
    type Ok = Option<View<K>>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<View<K>>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.state();
        let listing = K::rows(&mut state).iter().find(|l| l.id == id).cloned();
        Ok(listing.map(|listing| View {
            relations: state.relations(&listing),
            listing,
        }))
    }
}

impl<K: Rows> Database<Select<By<Vec<View<K>>, list::Filter>>>
    for Memory
{
    type Ok = Vec<View<K>>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<View<K>>, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut state = self.state();
        let mut listings = K::rows(&mut state)
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect::<Vec<_>>();
        listings.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
        });
        Ok(listings
            .into_iter()
            .map(|listing| View {
                relations: state.relations(&listing),
                listing,
            })
            .collect())
    }
}
