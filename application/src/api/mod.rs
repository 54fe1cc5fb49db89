//! HTTP API definitions.

pub mod prefinancing;
pub mod purchase;
pub mod sale;

use std::str::FromStr;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    routing, Extension, Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use service::{
    command::{
        create_listing, delete_listing, update_listing, Command,
        CreateListing, DeleteListing, UpdateListing,
    },
    domain::{
        crop_type,
        listing::{self, Descriptor, Field, InvalidField, Kind},
        reference, user,
    },
    infra::database,
    query,
    read::listing::{list, View},
    validation,
};
use tracerr::Traced;

use crate::{define_error, AsError, Error, Service, Session};

/// Builds the [`Router`] serving the [`Listing`]s of every kind.
///
/// The returned [`Router`] expects the [`Service`] to be provided as an
/// [`Extension`] layer.
///
/// [`Listing`]: service::domain::Listing
pub fn router() -> Router {
    macro_rules! listing_routes {
        ($router:expr, $kind:ty) => {
            $router
                .route(
                    <$kind as Resource>::PATH,
                    routing::get(self::list::<$kind>)
                        .post(self::create::<$kind>),
                )
                .route(
                    <$kind as Resource>::ITEM_PATH,
                    routing::get(self::get::<$kind>)
                        .put(self::update::<$kind>)
                        .delete(self::delete::<$kind>),
                )
        };
    }

    let router = Router::new();
    let router = listing_routes!(router, listing::Sale);
    let router = listing_routes!(router, listing::Purchase);
    listing_routes!(router, listing::Prefinancing)
}

/// Listing kind exposed over HTTP.
pub trait Resource: Descriptor {
    /// Path of the collection of [`Listing`]s of this kind.
    ///
    /// [`Listing`]: service::domain::Listing
    const PATH: &'static str;

    /// Path of a single [`Listing`] of this kind.
    ///
    /// [`Listing`]: service::domain::Listing
    const ITEM_PATH: &'static str;

    /// Body of a creation request.
    type Create: DeserializeOwned + Send + 'static;

    /// Body of an update request.
    type Update: DeserializeOwned + Send + 'static;

    /// Client-facing projection of a [`View`].
    type Projection: Serialize + From<View<Self>>;

    /// Builds a [`CreateListing`] [`Command`] on behalf of the `actor`.
    ///
    /// # Errors
    ///
    /// If the `body` contains a malformed field.
    fn create(
        body: Self::Create,
        actor: &Session,
    ) -> Result<CreateListing<Self>, Error>;

    /// Builds an [`UpdateListing`] [`Command`] of the [`Listing`] with the
    /// provided `id`.
    ///
    /// # Errors
    ///
    /// If the `body` contains a malformed field.
    ///
    /// [`Listing`]: service::domain::Listing
    fn update(
        id: listing::Id,
        body: Self::Update,
    ) -> Result<UpdateListing<Self>, Error>;
}

/// Lists the [`Listing`]s of the `R` kind, oldest first.
///
/// [`Listing`]: service::domain::Listing
#[tracing::instrument(skip_all, fields(listing.kind = %R::KIND))]
pub async fn list<R: Resource>(
    Extension(service): Extension<Service>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<R::Projection>>, Error>
where
    Service: service::Query<
        query::listing::List<R>,
        Ok = Vec<View<R>>,
        Err = Traced<database::Error>,
    >,
{
    let Query(params) = params.map_err(AsError::into_error)?;

    let views = service
        .execute(query::listing::List::<R>::by(params.into_filter()?))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(views.into_iter().map(R::Projection::from).collect()))
}

/// Returns the [`Listing`] of the `R` kind with the provided ID.
///
/// [`Listing`]: service::domain::Listing
#[tracing::instrument(skip_all, fields(listing.kind = %R::KIND))]
pub async fn get<R: Resource>(
    Extension(service): Extension<Service>,
    path: Result<Path<listing::Id>, PathRejection>,
) -> Result<Json<R::Projection>, Error>
where
    Service: service::Query<
        query::listing::ById<R>,
        Ok = Option<View<R>>,
        Err = Traced<database::Error>,
    >,
{
    let Path(id) = path.map_err(AsError::into_error)?;

    service
        .execute(query::listing::ById::<R>::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|view| Json(view.into()))
        .ok_or_else(|| ListingError::NotExists.into())
}

/// Creates a new [`Listing`] of the `R` kind.
///
/// [`Listing`]: service::domain::Listing
#[tracing::instrument(skip_all, fields(listing.kind = %R::KIND))]
pub async fn create<R: Resource>(
    Extension(service): Extension<Service>,
    session: Session,
    body: Result<Json<R::Create>, JsonRejection>,
) -> Result<(StatusCode, Json<R::Projection>), Error>
where
    Service: Command<
        CreateListing<R>,
        Ok = View<R>,
        Err = Traced<create_listing::ExecutionError>,
    >,
{
    let Json(body) = body.map_err(AsError::into_error)?;

    let view = service
        .execute(R::create(body, &session)?)
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(view.into())))
}

/// Updates the [`Listing`] of the `R` kind with the provided ID.
///
/// Fields absent from the request body are left unchanged.
///
/// [`Listing`]: service::domain::Listing
#[tracing::instrument(skip_all, fields(listing.kind = %R::KIND))]
pub async fn update<R: Resource>(
    Extension(service): Extension<Service>,
    _: Session,
    path: Result<Path<listing::Id>, PathRejection>,
    body: Result<Json<R::Update>, JsonRejection>,
) -> Result<Json<R::Projection>, Error>
where
    Service: Command<
        UpdateListing<R>,
        Ok = View<R>,
        Err = Traced<update_listing::ExecutionError>,
    >,
{
    let Path(id) = path.map_err(AsError::into_error)?;
    let Json(body) = body.map_err(AsError::into_error)?;

    service
        .execute(R::update(id, body)?)
        .await
        .map(|view| Json(view.into()))
        .map_err(AsError::into_error)
}

/// Deletes the [`Listing`] of the `R` kind with the provided ID.
///
/// [`Listing`]: service::domain::Listing
#[tracing::instrument(skip_all, fields(listing.kind = %R::KIND))]
pub async fn delete<R: Resource>(
    Extension(service): Extension<Service>,
    _: Session,
    path: Result<Path<listing::Id>, PathRejection>,
) -> Result<Json<Deleted>, Error>
where
    Service: Command<
        DeleteListing<R>,
        Ok = (),
        Err = Traced<delete_listing::ExecutionError>,
    >,
{
    let Path(id) = path.map_err(AsError::into_error)?;

    service
        .execute(DeleteListing::<R>::new(id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Deleted {
        message: "Annonce supprimée avec succès",
    }))
}

/// Query string of a [`list()`] request.
///
/// Empty values are treated as absent ones.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListQuery {
    /// ID of the owning [`User`].
    ///
    /// [`User`]: service::domain::User
    #[serde(default)]
    pub user_id: Option<String>,

    /// Status of the [`Listing`].
    ///
    /// [`Listing`]: service::domain::Listing
    #[serde(default)]
    pub statut: Option<String>,

    /// ID of the traded [`CropType`].
    ///
    /// [`CropType`]: service::domain::CropType
    #[serde(default)]
    pub type_culture_id: Option<String>,
}

impl ListQuery {
    /// Parses this [`ListQuery`] into a [`list::Filter`].
    ///
    /// # Errors
    ///
    /// If any non-empty value is malformed.
    pub fn into_filter(self) -> Result<list::Filter, Error> {
        fn invalid<E>(msg: &'static str) -> impl FnOnce(E) -> Error {
            move |_| Error::validation_failed(&msg)
        }

        let Self {
            user_id,
            statut,
            type_culture_id,
        } = self;

        Ok(list::Filter {
            user_id: present(user_id)
                .map(|id| id.trim().parse::<user::Id>())
                .transpose()
                .map_err(invalid("ID utilisateur invalide"))?,
            status: present(statut)
                .map(|s| s.parse::<listing::Status>())
                .transpose()
                .map_err(invalid("Statut invalide"))?,
            crop_type_id: present(type_culture_id)
                .map(|id| id.trim().parse::<crop_type::Id>())
                .transpose()
                .map_err(invalid("ID type culture invalide"))?,
        })
    }
}

/// Filters out empty query string values.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Body of a successful [`delete()`] response.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Deleted {
    /// Human-readable confirmation.
    pub message: &'static str,
}

/// Parses a client-supplied text `value` of the `field` of a `K` listing.
///
/// # Errors
///
/// If the `value` doesn't fit the `field`.
pub(crate) fn text<K, T>(field: Field, value: &str) -> Result<T, Error>
where
    K: Descriptor,
    T: FromStr,
{
    value.parse().map_err(|_| {
        InvalidField {
            kind: K::KIND,
            field,
            reason: "is malformed",
        }
        .into_error()
    })
}

/// Returns the name of the `field` in request bodies and projections of a
/// `kind` listing.
const fn field_name(kind: Kind, field: Field) -> &'static str {
    match field {
        Field::User => "user_id",
        Field::CropType => "type_culture_id",
        Field::Parcel => "parcelle_id",
        Field::Status => "statut",
        Field::Description => "description",
        Field::Quantity => "quantite",
        Field::UnitPrice => {
            if matches!(kind, Kind::Prefinancing) {
                "prix_kg_pref"
            } else {
                "prix_kg"
            }
        }
        Field::Photo => "photo",
        Field::FinancedAmount => "montant_pref",
    }
}

impl AsError for InvalidField {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "INVALID_FIELD",
            status_code: StatusCode::BAD_REQUEST,
            message: format!(
                "Champ `{}` invalide : {}",
                field_name(self.kind, self.field),
                self.reason,
            ),
            backtrace: None,
        })
    }
}

impl AsError for validation::Error {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidField(e) => e.try_as_error(),
            // Only the parcel presence depends on the listing kind.
            Self::MissingField(f) => Some(Error::validation_failed(&format!(
                "Champ `{}` manquant",
                field_name(Kind::Sale, *f),
            ))),
            Self::UnexpectedField(f) => {
                Some(Error::validation_failed(&format!(
                    "Champ `{}` non applicable",
                    field_name(Kind::Purchase, *f),
                )))
            }
            Self::UnresolvedReference(r) => Some(
                match r.kind() {
                    reference::Kind::User => ReferenceError::User,
                    reference::Kind::CropType => ReferenceError::CropType,
                    reference::Kind::Parcel => ReferenceError::Parcel,
                }
                .into(),
            ),
        }
    }
}

impl AsError for create_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::NotStored(_) => None,
        }
    }
}

impl AsError for update_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::NotExists(_) => Some(ListingError::NotExists.into()),
        }
    }
}

impl AsError for delete_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotExists(_) => Some(ListingError::NotExists.into()),
        }
    }
}

define_error! {
    enum ListingError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Annonce non trouvée"]
        NotExists,
    }
}

define_error! {
    enum ReferenceError {
        #[code = "REFERENCE_NOT_FOUND"]
        #[status = BAD_REQUEST]
        #[message = "Utilisateur introuvable"]
        User,

        #[code = "REFERENCE_NOT_FOUND"]
        #[status = BAD_REQUEST]
        #[message = "Type de culture introuvable"]
        CropType,

        #[code = "REFERENCE_NOT_FOUND"]
        #[status = BAD_REQUEST]
        #[message = "Parcelle introuvable"]
        Parcel,
    }
}


#[cfg(test)]
mod spec {
    use axum::{body::Body, Extension, Router};
    use common::DateTime;
    use http::{header, Method, Request, StatusCode};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{json, Value};
    use tower::ServiceExt as _;

    use super::fixture::{self, ALICE, FIELD, MAIZE, SECRET};

    fn app() -> Router {
        super::router().layer(Extension(fixture::service()))
    }

    fn token(secret: &[u8]) -> String {
        let claims = json!({
            "user_id": ALICE,
            "profil_id": 2,
            "exp": DateTime::now().unix_timestamp() + 3600,
        });
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn auth() -> Option<String> {
        Some(format!("Bearer {}", token(SECRET)))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        auth: Option<String>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let resp = app
            .clone()
            .oneshot(req.body(Body::from(body.to_owned())).unwrap())
            .await
            .unwrap();

        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn sale() -> String {
        json!({
            "statut": "disponible",
            "description": "Maïs sec",
            "type_culture_id": MAIZE,
            "parcelle_id": FIELD,
            "quantite": 10,
            "prix_kg": "250",
        })
        .to_string()
    }

    fn purchase() -> String {
        json!({
            "statut": "ouvert",
            "description": "Achat de maïs",
            "type_culture_id": MAIZE,
            "quantite": 500,
            "prix_kg": 180,
        })
        .to_string()
    }

    fn prefinancing() -> String {
        json!({
            "statut": "ouvert",
            "description": "Campagne 2025",
            "type_culture_id": MAIZE,
            "parcelle_id": FIELD,
            "quantite": 10,
            "prix_kg_pref": 25.5,
            "montant_pref": 1,
        })
        .to_string()
    }

    fn keys(value: &Value) -> Vec<&str> {
        let mut keys = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }

    #[tokio::test]
    async fn writes_require_token() {
        let app = app();
        for (method, uri) in [
            (Method::POST, "/annonces_vente"),
            (Method::POST, "/annonces_achat"),
            (Method::POST, "/annonces_pref"),
            (
                Method::PUT,
                "/annonces_vente/00000000-0000-0000-0000-000000000001",
            ),
            (
                Method::DELETE,
                "/annonces_pref/00000000-0000-0000-0000-000000000001",
            ),
        ] {
            let (status, body) = send(&app, method, uri, None, &sale()).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body, json!({ "error": "Token requis" }));
        }
    }

    #[tokio::test]
    async fn rejects_malformed_authorization() {
        let app = app();

        let (status, _) = send(
            &app,
            Method::POST,
            "/annonces_vente",
            Some("Basic dXNlcjpwYXNz".to_owned()),
            &sale(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            Method::POST,
            "/annonces_vente",
            Some("Bearer not-a-jwt".to_owned()),
            &sale(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/annonces_vente",
            Some(format!("Bearer {}", token(b"other-secret"))),
            &sale(),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Token invalide" }));
    }

    #[tokio::test]
    async fn rejects_non_uuid_path() {
        let (status, body) =
            send(&app(), Method::GET, "/annonces_achat/42", None, "").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "ID invalide" }));
    }

    #[tokio::test]
    async fn rejects_unparsable_filters() {
        let app = app();
        for uri in [
            "/annonces_vente?user_id=abc",
            "/annonces_achat?type_culture_id=maize",
        ] {
            let (status, _) = send(&app, Method::GET, uri, None, "").await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn rejects_malformed_bodies() {
        let app = app();

        let (status, _) =
            send(&app, Method::POST, "/annonces_vente", auth(), "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/annonces_achat",
            auth(),
            r#"{"statut": "ouvert"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/annonces_pref/00000000-0000-0000-0000-000000000001",
            auth(),
            r#"{"quantite": "beaucoup"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_malformed_text_fields() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/annonces_vente",
            auth(),
            &sale().replace("disponible", " disponible"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "Champ `statut` invalide : is malformed" }),
        );
    }

    #[tokio::test]
    async fn recomputes_financed_amount() {
        let app = app();

        let (status, created) =
            send(&app, Method::POST, "/annonces_pref", auth(), &prefinancing())
                .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["montant_pref"], json!(255.0));
        assert_eq!(created["prix_kg_pref"], json!(25.5));

        let uri = format!("/annonces_pref/{}", created["id"].as_str().unwrap());
        let (status, updated) =
            send(&app, Method::PUT, &uri, auth(), r#"{"quantite": 20}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["montant_pref"], json!(510.0));
        assert_eq!(updated["prix_kg_pref"], json!(25.5));
        assert_eq!(updated["quantite"], json!(20.0));
        assert_eq!(updated["statut"], json!("ouvert"));

        let (status, fetched) = send(&app, Method::GET, &uri, None, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn projects_resolved_relations() {
        let (status, created) =
            send(&app(), Method::POST, "/annonces_vente", auth(), &sale())
                .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            keys(&created),
            [
                "adresse",
                "description",
                "id",
                "libelle",
                "nom",
                "photo",
                "prix_kg",
                "quantite",
                "statut",
            ],
        );
        assert_eq!(created["nom"], json!("Awa Koné"));
        assert_eq!(created["libelle"], json!("Maïs"));
        assert_eq!(created["adresse"], json!("Route de Bouaké, km 12"));
        assert_eq!(created["photo"], json!(""));
        assert_eq!(created["prix_kg"], json!(250.0));
    }

    #[tokio::test]
    async fn filters_listings() {
        let app = app();
        let (status, _) =
            send(&app, Method::POST, "/annonces_achat", auth(), &purchase())
                .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, all) =
            send(&app, Method::GET, "/annonces_achat", None, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().map(Vec::len), Some(1));

        let (status, matching) = send(
            &app,
            Method::GET,
            &format!("/annonces_achat?type_culture_id={MAIZE}&statut="),
            None,
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(matching, all);

        let (status, none) = send(
            &app,
            Method::GET,
            "/annonces_achat\
             ?type_culture_id=00000000-0000-0000-0000-0000000000ff",
            None,
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(none, json!([]));
    }

    #[tokio::test]
    async fn rejects_unknown_references() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/annonces_vente",
            auth(),
            &sale().replace(MAIZE, "00000000-0000-0000-0000-0000000000ff"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Type de culture introuvable" }));
    }

    #[tokio::test]
    async fn rejects_parcel_of_purchase() {
        let mut body: Value = serde_json::from_str(&purchase()).unwrap();
        body["parcelle_id"] = json!(FIELD);

        let (status, body) = send(
            &app(),
            Method::POST,
            "/annonces_achat",
            auth(),
            &body.to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "Champ `parcelle_id` non applicable" }),
        );
    }

    #[tokio::test]
    async fn deleted_listing_is_gone() {
        let app = app();
        let (_, created) =
            send(&app, Method::POST, "/annonces_vente", auth(), &sale()).await;
        let uri =
            format!("/annonces_vente/{}", created["id"].as_str().unwrap());

        let (status, body) =
            send(&app, Method::DELETE, &uri, auth(), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "message": "Annonce supprimée avec succès" }),
        );

        let (status, body) = send(&app, Method::GET, &uri, None, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Annonce non trouvée" }));

        let (status, _) = send(&app, Method::DELETE, &uri, auth(), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, Method::PUT, &uri, auth(), r#"{"statut": "vendu"}"#)
                .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
