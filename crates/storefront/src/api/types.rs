//! Request bodies and query strings sent to the backend.
//!
//! Passwords are held as [`SecretString`] and only exposed by the serializer,
//! so they never show up in `Debug` output or tracing fields.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use hazel_lab_core::{AccountStatus, CategoryId, Email, Price, ProductId, Role, UserId};

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn expose_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// `{ "id": ... }` reference to another resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdRef<T> {
    pub id: T,
}

impl<T> From<T> for IdRef<T> {
    fn from(id: T) -> Self {
        Self { id }
    }
}

/// `POST /auth/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    #[serde(serialize_with = "expose_secret")]
    pub password: &'a SecretString,
}

/// `POST /itemscarrito`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddCartItemRequest {
    pub usuario: IdRef<UserId>,
    pub producto: IdRef<ProductId>,
    pub quantity: u32,
}

/// `PUT /itemscarrito/{id}/cantidad`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

/// Profile fields shared by user creation and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellidos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comuna: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<NaiveDate>,
}

/// `POST /usuarios`
#[derive(Debug, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    /// Canonical form, e.g. `12.345.678-5`.
    pub rut: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// `PUT /usuarios/{id}`
///
/// The password is omitted unless it is being changed.
#[derive(Debug, Serialize)]
pub struct UserUpdate {
    pub username: String,
    pub email: Email,
    pub rut: String,
    #[serde(
        serialize_with = "expose_optional_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<SecretString>,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// `POST /productos` and `PUT /productos/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cost: Price,
    pub stock: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_critico: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub destacado: bool,
    pub active_status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<IdRef<CategoryId>>,
}

/// Query for `GET /productos/buscar/avanzada`. Unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
    /// Only products at or below their critical stock. Sent only when set.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stock_bajo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destacado: Option<bool>,
    /// Whole pesos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio_min: Option<i64>,
    /// Whole pesos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio_max: Option<i64>,
}

/// Query for `GET /usuarios/buscar/avanzada`. Unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rol: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<AccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}
