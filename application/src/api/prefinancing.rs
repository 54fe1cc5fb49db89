//! [`Prefinancing`] listings API.

use common::Amount;
use serde::{Deserialize, Serialize};
use service::{
    command::{CreateListing, UpdateListing},
    domain::{
        crop_type,
        listing::{self, Field, Prefinancing},
        parcel, user,
    },
    read::listing::View,
};

use crate::{Error, Session};

use super::{text, Resource};

impl Resource for Prefinancing {
    const PATH: &'static str = "/annonces_pref";
    const ITEM_PATH: &'static str = "/annonces_pref/:id";

    type Create = CreateBody;
    type Update = UpdateBody;
    type Projection = Projection;

    fn create(
        body: CreateBody,
        actor: &Session,
    ) -> Result<CreateListing<Self>, Error> {
        let CreateBody {
            user_id,
            statut,
            description,
            type_culture_id,
            parcelle_id,
            quantite,
            prix_kg_pref,
        } = body;

        Ok(CreateListing {
            user_id: user_id.unwrap_or(actor.user_id),
            crop_type_id: type_culture_id,
            parcel_id: parcelle_id,
            status: text::<Self, _>(Field::Status, &statut)?,
            description: text::<Self, _>(Field::Description, &description)?,
            quantity: quantite,
            unit_price: prix_kg_pref,
            patch: (),
        })
    }

    fn update(
        id: listing::Id,
        body: UpdateBody,
    ) -> Result<UpdateListing<Self>, Error> {
        let UpdateBody {
            user_id,
            statut,
            description,
            type_culture_id,
            parcelle_id,
            quantite,
            prix_kg_pref,
        } = body;

        Ok(UpdateListing {
            user_id,
            crop_type_id: type_culture_id,
            parcel_id: parcelle_id,
            status: statut
                .map(|s| text::<Self, _>(Field::Status, &s))
                .transpose()?,
            description: description
                .map(|d| text::<Self, _>(Field::Description, &d))
                .transpose()?,
            quantity: quantite,
            unit_price: prix_kg_pref,
            ..UpdateListing::new(id)
        })
    }
}

/// Body of a request creating a new [`Prefinancing`] listing.
///
/// The financed amount is always computed, so a client-provided
/// `montant_pref` is ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateBody {
    /// ID of the owner, the actor performing the request if absent.
    pub user_id: Option<user::Id>,

    /// Status of the listing.
    pub statut: String,

    /// Description of the listing.
    pub description: String,

    /// ID of the prefinanced crop type.
    pub type_culture_id: crop_type::Id,

    /// ID of the parcel the crop is grown on.
    pub parcelle_id: Option<parcel::Id>,

    /// Prefinanced quantity.
    pub quantite: Amount,

    /// Price per kilogram.
    #[serde(alias = "prix")]
    pub prix_kg_pref: Amount,
}

/// Body of a request updating a [`Prefinancing`] listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateBody {
    /// New owner ID.
    pub user_id: Option<user::Id>,

    /// New status.
    pub statut: Option<String>,

    /// New description.
    pub description: Option<String>,

    /// New crop type ID.
    pub type_culture_id: Option<crop_type::Id>,

    /// New parcel ID.
    pub parcelle_id: Option<parcel::Id>,

    /// New quantity.
    pub quantite: Option<Amount>,

    /// New price per kilogram.
    #[serde(alias = "prix")]
    pub prix_kg_pref: Option<Amount>,
}

/// Client-facing projection of a [`Prefinancing`] listing.
#[derive(Clone, Debug, Serialize)]
pub struct Projection {
    /// ID of the listing.
    pub id: listing::Id,

    /// Status of the listing.
    pub statut: String,

    /// Description of the listing.
    pub description: String,

    /// Financed amount: the price per kilogram times the quantity.
    pub montant_pref: Amount,

    /// Price per kilogram.
    pub prix_kg_pref: Amount,

    /// Prefinanced quantity.
    pub quantite: Amount,

    /// Name of the owner.
    pub nom: String,

    /// Label of the crop type.
    pub libelle: String,

    /// Address of the parcel.
    pub adresse: String,

    /// Surface of the parcel.
    pub surface: String,
}

impl From<View<Prefinancing>> for Projection {
    fn from(view: View<Prefinancing>) -> Self {
        let View {
            listing,
            relations,
        } = view;
        let (adresse, surface): (String, String) = relations
            .parcel
            .map(|p| (p.address.into(), p.surface.into()))
            .unwrap_or_default();

        Self {
            id: listing.id,
            statut: listing.status.into(),
            description: listing.description.into(),
            montant_pref: listing.attributes.financed_amount.amount(),
            prix_kg_pref: listing.unit_price.amount(),
            quantite: listing.quantity.amount(),
            nom: relations.user.map(|u| u.name.into()).unwrap_or_default(),
            libelle: relations
                .crop_type
                .map(|c| c.label.into())
                .unwrap_or_default(),
            adresse,
            surface,
        }
    }
}
