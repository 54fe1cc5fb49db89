//! [`Prefinancing`] listing definitions.

use common::Amount;
use derive_more::{Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use super::{Descriptor, Field, InvalidField, Kind, Listing};

/// [`Listing`] of a future harvest a grower seeks financing for.
///
/// The [`FinancedAmount`] is never supplied by clients, but always derived
/// from the quantity and the unit price.
#[derive(Clone, Copy, Debug)]
pub struct Prefinancing;

impl Descriptor for Prefinancing {
    const KIND: Kind = Kind::Prefinancing;
    const HAS_PARCEL: bool = true;

    type Attributes = Attributes;
    type Patch = ();

    fn apply(_: &mut Attributes, (): ()) {}

    fn derive(listing: &mut Listing<Self>) -> Result<(), InvalidField> {
        listing.attributes.financed_amount = listing
            .unit_price
            .amount()
            .checked_mul(listing.quantity.amount())
            .map(FinancedAmount)
            .ok_or(InvalidField {
                kind: Self::KIND,
                field: Field::FinancedAmount,
                reason: "overflows",
            })?;
        Ok(())
    }
}

/// [`Prefinancing`]-specific attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Attributes {
    /// [`FinancedAmount`] of the harvest.
    pub financed_amount: FinancedAmount,
}

/// Total amount to be financed: the unit price multiplied by the quantity.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct FinancedAmount(Amount);

impl FinancedAmount {
    /// Returns the [`Amount`] of this [`FinancedAmount`].
    #[must_use]
    pub const fn amount(self) -> Amount {
        self.0
    }
}
