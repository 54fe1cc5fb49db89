//! [`Purchase`] listings API.

use common::Amount;
use serde::{Deserialize, Serialize};
use service::{
    command::{CreateListing, UpdateListing},
    domain::{
        crop_type,
        listing::{self, Field, Purchase},
        parcel,
    },
    read::listing::View,
};

use crate::{Error, Session};

use super::{text, Resource};

impl Resource for Purchase {
    const PATH: &'static str = "/annonces_achat";
    const ITEM_PATH: &'static str = "/annonces_achat/:id";

    type Create = CreateBody;
    type Update = UpdateBody;
    type Projection = Projection;

    fn create(
        body: CreateBody,
        actor: &Session,
    ) -> Result<CreateListing<Self>, Error> {
        let CreateBody {
            statut,
            description,
            type_culture_id,
            parcelle_id,
            quantite,
            prix_kg,
        } = body;

        Ok(CreateListing {
            user_id: actor.user_id,
            crop_type_id: type_culture_id,
            parcel_id: parcelle_id,
            status: text::<Self, _>(Field::Status, &statut)?,
            description: text::<Self, _>(Field::Description, &description)?,
            quantity: quantite,
            unit_price: prix_kg,
            patch: (),
        })
    }

    fn update(
        id: listing::Id,
        body: UpdateBody,
    ) -> Result<UpdateListing<Self>, Error> {
        let UpdateBody {
            statut,
            description,
            type_culture_id,
            parcelle_id,
            quantite,
            prix_kg,
        } = body;

        Ok(UpdateListing {
            crop_type_id: type_culture_id,
            parcel_id: parcelle_id,
            status: statut
                .map(|s| text::<Self, _>(Field::Status, &s))
                .transpose()?,
            description: description
                .map(|d| text::<Self, _>(Field::Description, &d))
                .transpose()?,
            quantity: quantite,
            unit_price: prix_kg,
            ..UpdateListing::new(id)
        })
    }
}

/// Body of a request creating a new [`Purchase`] listing.
///
/// The owner is the actor performing the request. Purchases aren't tied to a
/// parcel, so a provided `parcelle_id` is rejected.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateBody {
    /// Status of the listing.
    pub statut: String,

    /// Description of the listing.
    pub description: String,

    /// ID of the requested crop type.
    pub type_culture_id: crop_type::Id,

    /// Must be absent.
    pub parcelle_id: Option<parcel::Id>,

    /// Requested quantity.
    pub quantite: Amount,

    /// Offered price per kilogram.
    pub prix_kg: Amount,
}

/// Body of a request updating a [`Purchase`] listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateBody {
    /// New status.
    pub statut: Option<String>,

    /// New description.
    pub description: Option<String>,

    /// New crop type ID.
    pub type_culture_id: Option<crop_type::Id>,

    /// Must be absent.
    pub parcelle_id: Option<parcel::Id>,

    /// New quantity.
    pub quantite: Option<Amount>,

    /// New price per kilogram.
    pub prix_kg: Option<Amount>,
}

/// Client-facing projection of a [`Purchase`] listing.
#[derive(Clone, Debug, Serialize)]
pub struct Projection {
    /// ID of the listing.
    pub id: listing::Id,

    /// Status of the listing.
    pub statut: String,

    /// Description of the listing.
    pub description: String,

    /// Requested quantity.
    pub quantite: Amount,

    /// Offered price per kilogram.
    pub prix_kg: Amount,

    /// Name of the owner.
    pub nom: String,

    /// Label of the crop type.
    pub libelle: String,
}

impl From<View<Purchase>> for Projection {
    fn from(view: View<Purchase>) -> Self {
        let View {
            listing,
            relations,
        } = view;

        Self {
            id: listing.id,
            statut: listing.status.into(),
            description: listing.description.into(),
            quantite: listing.quantity.amount(),
            prix_kg: listing.unit_price.amount(),
            nom: relations.user.map(|u| u.name.into()).unwrap_or_default(),
            libelle: relations
                .crop_type
                .map(|c| c.label.into())
                .unwrap_or_default(),
        }
    }
}
