//! [`Purchase`] listing definitions.

use super::{Descriptor, Kind};

/// [`Listing`] of a crop a buyer wants to purchase.
///
/// [`Listing`]: super::Listing
#[derive(Clone, Copy, Debug)]
pub struct Purchase;

impl Descriptor for Purchase {
    const KIND: Kind = Kind::Purchase;
    const HAS_PARCEL: bool = false;

    type Attributes = ();
    type Patch = ();

    fn apply(_: &mut (), (): ()) {}
}
