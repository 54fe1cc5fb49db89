//! [`Database`] implementations resolving entities referenced by listings.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{crop_type, parcel, user, CropType, Parcel, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT nom \
            FROM users \
            WHERE id = $1::INT8";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| User {
                id,
                name: row.get("nom"),
            }))
    }
}

impl<C> Database<Select<By<Option<CropType>, crop_type::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<CropType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<CropType>, crop_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT libelle \
            FROM type_culture \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| CropType {
                id,
                label: row.get("libelle"),
            }))
    }
}

impl<C> Database<Select<By<Option<Parcel>, parcel::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Parcel>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Parcel>, parcel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT adresse, surface \
            FROM parcelle \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Parcel {
                id,
                address: row.get("adresse"),
                surface: row.get("surface"),
            }))
    }
}
