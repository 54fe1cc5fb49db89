//! [`Query`] collection related to [`Listing`]s.

use common::operations::By;

use crate::{
    domain::listing,
    read::listing::{list, View},
};
#[cfg(doc)]
use crate::{domain::Listing, Query};

use super::DatabaseQuery;

/// Queries a [`View`] of a [`Listing`] by its [`listing::Id`].
pub type ById<K> = DatabaseQuery<By<Option<View<K>>, listing::Id>>;

/// Queries [`View`]s of all the [`Listing`]s matching a [`list::Filter`],
/// oldest first.
pub type List<K> = DatabaseQuery<By<Vec<View<K>>, list::Filter>>;
