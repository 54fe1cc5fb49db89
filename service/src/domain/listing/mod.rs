//! [`Listing`] definitions.

pub mod prefinancing;
pub mod purchase;
pub mod sale;

use std::fmt;

use common::{define_kind, unit, Amount, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{crop_type, parcel, user};

pub use self::{
    prefinancing::Prefinancing, purchase::Purchase, sale::Sale,
};

/// Offer published by a [`User`] on the marketplace.
///
/// What differs between kinds of listings is described by the `K`
/// [`Descriptor`].
///
/// [`User`]: super::User
#[derive(Clone, Debug)]
pub struct Listing<K: Descriptor> {
    /// ID of this [`Listing`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Listing`].
    ///
    /// [`User`]: super::User
    pub user_id: user::Id,

    /// ID of the [`CropType`] being traded.
    ///
    /// [`CropType`]: super::CropType
    pub crop_type_id: crop_type::Id,

    /// ID of the [`Parcel`] the crop is grown on.
    ///
    /// Always present for kinds having a [`Descriptor::HAS_PARCEL`], and
    /// always absent otherwise.
    ///
    /// [`Parcel`]: super::Parcel
    pub parcel_id: Option<parcel::Id>,

    /// [`Status`] of this [`Listing`].
    pub status: Status,

    /// [`Description`] of this [`Listing`].
    pub description: Description,

    /// Offered or requested [`Quantity`].
    pub quantity: Quantity,

    /// [`UnitPrice`] of the crop.
    pub unit_price: UnitPrice,

    /// Kind-specific attributes.
    pub attributes: K::Attributes,

    /// [`DateTime`] when this [`Listing`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime<K>,
}

/// Description of a kind of [`Listing`].
pub trait Descriptor: Copy + fmt::Debug + Send + Sync + 'static {
    /// [`Kind`] being described.
    const KIND: Kind;

    /// Indicates whether [`Listing`]s of this kind are bound to a [`Parcel`].
    ///
    /// [`Parcel`]: super::Parcel
    const HAS_PARCEL: bool;

    /// Attributes specific to this kind of [`Listing`].
    type Attributes: Clone + fmt::Debug + Default + Send + Sync;

    /// Client-supplied changes of the [`Descriptor::Attributes`].
    type Patch: Clone + fmt::Debug + Default + Send + Sync;

    /// Applies the provided `patch` to the `attributes`.
    fn apply(attributes: &mut Self::Attributes, patch: Self::Patch);

    /// Recomputes the derived attributes of the provided [`Listing`].
    ///
    /// Called every time after the [`Listing`] is changed.
    ///
    /// # Errors
    ///
    /// If a derived attribute cannot be computed out of the [`Listing`]'s
    /// fields.
    fn derive(listing: &mut Listing<Self>) -> Result<(), InvalidField> {
        _ = listing;
        Ok(())
    }
}

define_kind! {
    #[doc = "Kind of a [`Listing`]."]
    enum Kind {
        #[doc = "[`Sale`] listing."]
        Sale = 1,

        #[doc = "[`Purchase`] listing."]
        Purchase = 2,

        #[doc = "[`Prefinancing`] listing."]
        Prefinancing = 3,
    }
}

define_kind! {
    #[doc = "Client-settable [`Field`] of a [`Listing`]."]
    enum Field {
        #[doc = "[`Listing::user_id`]."]
        User = 1,

        #[doc = "[`Listing::crop_type_id`]."]
        CropType = 2,

        #[doc = "[`Listing::parcel_id`]."]
        Parcel = 3,

        #[doc = "[`Listing::status`]."]
        Status = 4,

        #[doc = "[`Listing::description`]."]
        Description = 5,

        #[doc = "[`Listing::quantity`]."]
        Quantity = 6,

        #[doc = "[`Listing::unit_price`]."]
        UnitPrice = 7,

        #[doc = "[`sale::Photo`]."]
        Photo = 8,

        #[doc = "[`prefinancing::FinancedAmount`]."]
        FinancedAmount = 9,
    }
}

/// Error of a [`Field`] holding a value out of its allowed range.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("`{field}` of `{kind}` listing {reason}")]
pub struct InvalidField {
    /// [`Kind`] of the [`Listing`] holding the invalid value.
    pub kind: Kind,

    /// [`Field`] holding the invalid value.
    pub field: Field,

    /// Reason of the value being invalid.
    pub reason: &'static str,
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[expect(clippy::new_without_default, reason = "random")]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Status of a [`Listing`] (`disponible`, `vendu`, etc)."]
    pub struct Status(check = crate::domain::text::is_label);
}

define_text! {
    #[doc = "Free-form description of a [`Listing`]."]
    pub struct Description(check = crate::domain::text::is_free_text);
}

impl Default for Description {
    fn default() -> Self {
        Self(String::new())
    }
}

/// Quantity of a crop (in kilograms) offered or requested by a [`Listing`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Quantity(Amount);

impl Quantity {
    /// Creates a new [`Quantity`] if the provided [`Amount`] is positive.
    #[must_use]
    pub fn new(amount: Amount) -> Option<Self> {
        amount.is_positive().then_some(Self(amount))
    }

    /// Returns the [`Amount`] of this [`Quantity`].
    #[must_use]
    pub const fn amount(self) -> Amount {
        self.0
    }
}

/// Price of a crop per kilogram.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct UnitPrice(Amount);

impl UnitPrice {
    /// Creates a new [`UnitPrice`] if the provided [`Amount`] is positive.
    #[must_use]
    pub fn new(amount: Amount) -> Option<Self> {
        amount.is_positive().then_some(Self(amount))
    }

    /// Returns the [`Amount`] of this [`UnitPrice`].
    #[must_use]
    pub const fn amount(self) -> Amount {
        self.0
    }
}

/// [`DateTime`] when a [`Listing`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime<K> = DateTimeOf<(Listing<K>, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Amount;

    use super::{Kind, Quantity, UnitPrice};

    #[test]
    fn amounts_are_positive() {
        let amount = |s: &str| s.parse::<Amount>().unwrap();

        assert!(Quantity::new(amount("0.5")).is_some());
        assert!(Quantity::new(amount("0")).is_none());
        assert!(Quantity::new(amount("-3")).is_none());
        assert!(UnitPrice::new(amount("25.5")).is_some());
        assert!(UnitPrice::new(Amount::ZERO).is_none());
    }

    #[test]
    fn kind_names() {
        assert_eq!(Kind::Sale.as_str(), "sale");
        assert_eq!(Kind::Prefinancing.to_string(), "prefinancing");
        assert_eq!("purchase".parse::<Kind>().unwrap(), Kind::Purchase);
    }
}
