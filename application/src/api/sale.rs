//! [`Sale`] listings API.

use common::Amount;
use serde::{Deserialize, Serialize};
use service::{
    command::{CreateListing, UpdateListing},
    domain::{
        crop_type,
        listing::{self, sale::Photo, Field, Sale},
        parcel,
    },
    read::listing::View,
};

use crate::{Error, Session};

use super::{text, Resource};

impl Resource for Sale {
    const PATH: &'static str = "/annonces_vente";
    const ITEM_PATH: &'static str = "/annonces_vente/:id";

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
            photo,
        } = body;

        Ok(CreateListing {
            user_id: actor.user_id,
            crop_type_id: type_culture_id,
            parcel_id: parcelle_id,
            status: text::<Self, _>(Field::Status, &statut)?,
            description: text::<Self, _>(Field::Description, &description)?,
            quantity: quantite,
            unit_price: prix_kg,
            patch: photo
                .map(|p| text::<Self, Photo>(Field::Photo, &p))
                .transpose()?,
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
            photo,
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
            patch: photo
                .map(|p| text::<Self, Photo>(Field::Photo, &p))
                .transpose()?,
            ..UpdateListing::new(id)
        })
    }
}

/// Body of a request creating a new [`Sale`] listing.
///
/// The owner is the actor performing the request.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateBody {
    /// Status of the listing.
    pub statut: String,

    /// Description of the listing.
    pub description: String,

    /// ID of the crop type on sale.
    pub type_culture_id: crop_type::Id,

    /// ID of the parcel the crop is grown on.
    pub parcelle_id: Option<parcel::Id>,

    /// Quantity on sale.
    pub quantite: Amount,

    /// Price per kilogram.
    pub prix_kg: Amount,

    /// Photo of the crop.
    pub photo: Option<String>,
}

/// Body of a request updating a [`Sale`] listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateBody {
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
    pub prix_kg: Option<Amount>,

    /// New photo.
    pub photo: Option<String>,
}

/// Client-facing projection of a [`Sale`] listing.
#[derive(Clone, Debug, Serialize)]
pub struct Projection {
    /// ID of the listing.
    pub id: listing::Id,

    /// Photo of the crop, empty if none.
    pub photo: String,

    /// Status of the listing.
    pub statut: String,

    /// Description of the listing.
    pub description: String,

    /// Quantity on sale.
    pub quantite: Amount,

    /// Price per kilogram.
    pub prix_kg: Amount,

    /// Name of the owner.
    pub nom: String,

    /// Label of the crop type.
    pub libelle: String,

    /// Address of the parcel.
    pub adresse: String,
}

impl From<View<Sale>> for Projection {
    fn from(view: View<Sale>) -> Self {
        let View {
            listing,
            relations,
        } = view;

        Self {
            id: listing.id,
            photo: listing
                .attributes
                .photo
                .map(Into::into)
                .unwrap_or_default(),
            statut: listing.status.into(),
            description: listing.description.into(),
            quantite: listing.quantity.amount(),
            prix_kg: listing.unit_price.amount(),
            nom: relations.user.map(|u| u.name.into()).unwrap_or_default(),
            libelle: relations
                .crop_type
                .map(|c| c.label.into())
                .unwrap_or_default(),
            adresse: relations
                .parcel
                .map(|p| p.address.into())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod spec {
    use serde_json::{json, Value};
    use service::{
        domain::listing::{sale::Photo, Sale},
        read::listing::{Relations, View},
    };

    use crate::api::fixture;

    use super::{Projection, UpdateBody};

    fn project(view: View<Sale>) -> Value {
        let json = serde_json::to_string(&Projection::from(view)).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn projects_relations_instead_of_ids() {
        let mut listing = fixture::listing::<Sale>();
        listing.attributes.photo = Photo::new("/static/mais.jpg");
        let id = listing.id;

        let json = project(View {
            listing,
            relations: fixture::relations(),
        });

        assert_eq!(
            json,
            json!({
                "id": id.to_string(),
                "photo": "/static/mais.jpg",
                "statut": "disponible",
                "description": "Récolte 2024",
                "quantite": 10.0,
                "prix_kg": 25.5,
                "nom": "Awa Koné",
                "libelle": "Maïs",
                "adresse": "Route de Bouaké, km 12",
            }),
        );
    }

    #[test]
    fn projects_missing_relations_as_empty() {
        let json = project(View {
            listing: fixture::listing::<Sale>(),
            relations: Relations::default(),
        });

        assert_eq!(json["photo"], json!(""));
        assert_eq!(json["nom"], json!(""));
        assert_eq!(json["libelle"], json!(""));
        assert_eq!(json["adresse"], json!(""));
    }

    #[test]
    fn update_body_fields_are_optional() {
        let body: UpdateBody =
            serde_json::from_str(r#"{"quantite": "20"}"#).unwrap();

        assert_eq!(
            body.quantite.map(|q| q.to_string()).as_deref(),
            Some("20"),
        );
        assert!(body.prix_kg.is_none());
        assert!(body.statut.is_none());
        assert!(body.photo.is_none());
    }
}
