//! [`Listing`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, sale, Descriptor, Prefinancing, Purchase, Sale},
        CropType, Listing, Parcel, User,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::listing::{list, Relations, View},
};

/// [`Descriptor`] of a [`Listing`] kind stored in its own Postgres table.
///
/// All the tables share the `id`, `user_id`, `type_culture_id`, `statut`,
/// `description`, `quantite` and `created_at` columns, while the price column
/// and the kind-specific attributes differ.
pub trait Table: Descriptor {
    /// Name of the table.
    const NAME: &'static str;

    /// Name of the column storing the [`listing::UnitPrice`].
    const PRICE_COLUMN: &'static str;

    /// Names of the columns storing the [`Descriptor::Attributes`].
    const ATTRIBUTE_COLUMNS: &'static [&'static str];

    /// Reads the [`Descriptor::Attributes`] from the provided [`Row`].
    fn read_attributes(row: &Row) -> Self::Attributes;

    /// Returns the values of the [`Table::ATTRIBUTE_COLUMNS`], in the same
    /// order.
    fn attribute_values(
        attributes: &Self::Attributes,
    ) -> Vec<&(dyn ToSql + Sync)>;
}

impl Table for Sale {
    const NAME: &'static str = "annonces_vente";
    const PRICE_COLUMN: &'static str = "prix_kg";
    const ATTRIBUTE_COLUMNS: &'static [&'static str] = &["photo"];

    fn read_attributes(row: &Row) -> sale::Attributes {
        sale::Attributes {
            photo: row.get("photo"),
        }
    }

    fn attribute_values(
        attributes: &sale::Attributes,
    ) -> Vec<&(dyn ToSql + Sync)> {
        vec![&attributes.photo]
    }
}

impl Table for Purchase {
    const NAME: &'static str = "annonces_achat";
    const PRICE_COLUMN: &'static str = "prix_kg";
    const ATTRIBUTE_COLUMNS: &'static [&'static str] = &[];

    fn read_attributes(_: &Row) {}

    fn attribute_values((): &()) -> Vec<&(dyn ToSql + Sync)> {
        vec![]
    }
}

impl Table for Prefinancing {
    const NAME: &'static str = "annonces_prefinancement";
    const PRICE_COLUMN: &'static str = "prix_kg_pref";
    const ATTRIBUTE_COLUMNS: &'static [&'static str] = &["montant_pref"];

    fn read_attributes(row: &Row) -> listing::prefinancing::Attributes {
        listing::prefinancing::Attributes {
            financed_amount: row.get("montant_pref"),
        }
    }

    fn attribute_values(
        attributes: &listing::prefinancing::Attributes,
    ) -> Vec<&(dyn ToSql + Sync)> {
        vec![&attributes.financed_amount]
    }
}

/// Returns the columns of the `K` table along with their values in the
/// provided [`Listing`].
fn columns<K: Table>(
    listing: &Listing<K>,
) -> Vec<(&'static str, &(dyn ToSql + Sync))> {
    let mut columns: Vec<(&'static str, &(dyn ToSql + Sync))> = vec![
        ("id", &listing.id),
        ("user_id", &listing.user_id),
        ("type_culture_id", &listing.crop_type_id),
        ("statut", &listing.status),
        ("description", &listing.description),
        ("quantite", &listing.quantity),
        (K::PRICE_COLUMN, &listing.unit_price),
        ("created_at", &listing.created_at),
    ];
    if K::HAS_PARCEL {
        columns.push(("parcelle_id", &listing.parcel_id));
    }
    columns.extend(
        K::ATTRIBUTE_COLUMNS
            .iter()
            .copied()
            .zip(K::attribute_values(&listing.attributes)),
    );
    columns
}

/// Returns the `K` table columns to select, qualified with the `l` alias.
fn select_list<K: Table>() -> String {
    let parcel = K::HAS_PARCEL.then_some("parcelle_id");
    [
        "id",
        "user_id",
        "type_culture_id",
        "statut",
        "description",
        "quantite",
        K::PRICE_COLUMN,
        "created_at",
    ]
    .into_iter()
    .chain(parcel)
    .chain(K::ATTRIBUTE_COLUMNS.iter().copied())
    .format_with(", ", |c, f| f(&format_args!("l.{c}")))
    .to_string()
}

/// Reads a [`Listing`] of the `K` kind from the provided [`Row`].
fn read_listing<K: Table>(row: &Row) -> Listing<K> {
    Listing {
        id: row.get("id"),
        user_id: row.get("user_id"),
        crop_type_id: row.get("type_culture_id"),
        parcel_id: if K::HAS_PARCEL {
            row.get("parcelle_id")
        } else {
            None
        },
        status: row.get("statut"),
        description: row.get("description"),
        quantity: row.get("quantite"),
        unit_price: row.get(K::PRICE_COLUMN),
        attributes: K::read_attributes(row),
        created_at: row.get("created_at"),
    }
}

/// Reads a [`View`] of a [`Listing`] of the `K` kind from the provided
/// [`Row`], selected by the [`select_views()`] SQL.
fn read_view<K: Table>(row: &Row) -> View<K> {
    let listing = read_listing::<K>(row);
    let relations = Relations {
        user: row
            .get::<_, Option<_>>("user_name")
            .map(|name| User {
                id: listing.user_id,
                name,
            }),
        crop_type: row
            .get::<_, Option<_>>("crop_type_label")
            .map(|label| CropType {
                id: listing.crop_type_id,
                label,
            }),
        parcel: if K::HAS_PARCEL {
            listing
                .parcel_id
                .zip(row.get::<_, Option<_>>("parcel_address"))
                .map(|(id, address)| Parcel {
                    id,
                    address,
                    surface: row.get("parcel_surface"),
                })
        } else {
            None
        },
    };
    View { listing, relations }
}

/// Returns SQL selecting [`View`]s of the `K` table rows matching the
/// provided SQL `condition`, oldest first.
fn select_views<K: Table>(condition: &str) -> String {
    let (parcel_columns, parcel_join) = if K::HAS_PARCEL {
        (
            ", p.adresse AS parcel_address, p.surface AS parcel_surface",
            "LEFT JOIN parcelle AS p ON p.id = l.parcelle_id",
        )
    } else {
        ("", "")
    };
    format!(
        "SELECT {columns}, \
                u.nom AS user_name, \
                tc.libelle AS crop_type_label\
                {parcel_columns} \
         FROM {table} AS l \
         LEFT JOIN users AS u ON u.id = l.user_id \
         LEFT JOIN type_culture AS tc ON tc.id = l.type_culture_id \
         {parcel_join} \
         WHERE {condition} \
         ORDER BY l.created_at ASC, l.id ASC",
        columns = select_list::<K>(),
        table = K::NAME,
    )
}

impl<C, K> Database<Select<By<Option<Listing<K>>, listing::Id>>>
    for Postgres<C>
where
    C: Connection,
    K: Table,
{
    type Ok = Option<Listing<K>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing<K>>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {columns} \
             FROM {table} AS l \
             WHERE l.id = $1::UUID",
            columns = select_list::<K>(),
            table = K::NAME,
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(read_listing))
    }
}

/// Builds an `INSERT` statement of the `K` table binding the provided
/// columns to `$1`, `$2` and so on.
fn insert_statement<K: Table>(names: &[&str]) -> String {
    let placeholders = (1..=names.len()).map(|n| format!("${n}")).join(", ");
    format!(
        "INSERT INTO {table} ({names}) VALUES ({placeholders})",
        table = K::NAME,
        names = names.iter().join(", "),
    )
}

/// Builds an `UPDATE` statement of the `K` table binding the provided
/// columns to `$1`, `$2` and so on.
///
/// The first column must be `id`, identifying the updated row.
fn update_statement<K: Table>(names: &[&str]) -> String {
    let updates = names
        .iter()
        .enumerate()
        .skip(1)
        .format_with(", ", |(n, c), f| f(&format_args!("{c} = ${}", n + 1)));
    format!("UPDATE {table} SET {updates} WHERE id = $1", table = K::NAME)
}

impl<C, K> Database<Insert<Listing<K>>> for Postgres<C>
where
    C: Connection,
    K: Table,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing<K>>,
    ) -> Result<Self::Ok, Self::Err> {
        let columns = columns(&listing);
        let (names, values): (Vec<_>, Vec<_>) = columns.into_iter().unzip();

        let sql = insert_statement::<K>(&names);
        self.exec(sql.as_str(), &values)
            .await
            .map(drop)
            .map_err(tracerr::wrap!())
    }
}

impl<C, K> Database<Update<Listing<K>>> for Postgres<C>
where
    C: Connection,
    K: Table,
{
    /// Whether the [`Listing`] existed and has been updated.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing<K>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Creation time is immutable once written.
        let (names, values): (Vec<_>, Vec<_>) = columns(&listing)
            .into_iter()
            .filter(|(c, _)| *c != "created_at")
            .unzip();

        let sql = update_statement::<K>(&names);
        self.exec(sql.as_str(), &values)
            .await
            .map(|rows| rows > 0)
            .map_err(tracerr::wrap!())
    }
}

impl<C, K> Database<Delete<By<Listing<K>, listing::Id>>> for Postgres<C>
where
    C: Connection,
    K: Table,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Listing<K>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!("DELETE FROM {} WHERE id = $1::UUID", K::NAME);
        self.exec(sql.as_str(), &[&id])
            .await
            .map(drop)
            .map_err(tracerr::wrap!())
    }
}

impl<C, K> Database<Select<By<Option<View<K>>, listing::Id>>> for Postgres<C>
where
    C: Connection,
    K: Table,
{
    type Ok = Option<View<K>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<View<K>>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = select_views::<K>("l.id = $1::UUID");
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(read_view))
    }
}

impl<C, K> Database<Select<By<Vec<View<K>>, list::Filter>>> for Postgres<C>
where
    C: Connection,
    K: Table,
{
    type Ok = Vec<View<K>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<View<K>>, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Filter {
            user_id,
            status,
            crop_type_id,
        } = by.into_inner();

        let mut params: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];
        if let Some(id) = &user_id {
            params.push(id);
            conditions.push(format!("l.user_id = ${}::INT8", params.len()));
        }
        if let Some(status) = &status {
            params.push(status);
            conditions.push(format!("l.statut = ${}::TEXT", params.len()));
        }
        if let Some(id) = &crop_type_id {
            params.push(id);
            conditions
                .push(format!("l.type_culture_id = ${}::UUID", params.len()));
        }
        let condition = if conditions.is_empty() {
            "TRUE".to_owned()
        } else {
            conditions.join(" AND ")
        };

        let sql = select_views::<K>(&condition);
        Ok(self
            .query(sql.as_str(), &params)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(read_view)
            .collect())
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::listing::{Prefinancing, Purchase, Sale};

    use super::{insert_statement, select_list, select_views, update_statement};

    #[test]
    fn selects_kind_columns() {
        assert_eq!(
            select_list::<Purchase>(),
            "l.id, l.user_id, l.type_culture_id, l.statut, l.description, \
             l.quantite, l.prix_kg, l.created_at",
        );
        assert!(select_list::<Sale>().ends_with("l.parcelle_id, l.photo"));
        assert!(select_list::<Prefinancing>()
            .contains("l.prix_kg_pref, l.created_at, l.parcelle_id, \
                       l.montant_pref"));
    }

    #[test]
    fn joins_parcel_only_when_bound() {
        assert!(select_views::<Sale>("TRUE").contains("LEFT JOIN parcelle"));
        assert!(!select_views::<Purchase>("TRUE").contains("parcelle"));
        assert!(select_views::<Purchase>("TRUE")
            .ends_with("ORDER BY l.created_at ASC, l.id ASC"));
    }

    #[test]
    fn inserts_without_overwriting() {
        let sql = insert_statement::<Purchase>(&["id", "statut", "prix_kg"]);

        assert_eq!(
            sql,
            "INSERT INTO annonces_achat (id, statut, prix_kg) \
             VALUES ($1, $2, $3)",
        );
        assert!(!sql.contains("CONFLICT"));
    }

    #[test]
    fn updates_existing_row_only() {
        let sql = update_statement::<Prefinancing>(&[
            "id",
            "quantite",
            "prix_kg_pref",
            "montant_pref",
        ]);

        assert_eq!(
            sql,
            "UPDATE annonces_prefinancement \
             SET quantite = $2, prix_kg_pref = $3, montant_pref = $4 \
             WHERE id = $1",
        );
        assert!(!sql.contains("INSERT"));
    }
}
