//! User account records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use hazel_lab_core::{AccountStatus, Email, Role, UserId};

/// A user account as returned by `/usuarios` and `/auth/login`.
///
/// The backend never returns the password hash to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    pub email: Email,
    /// Canonical RUT (`12.345.678-5`). Older accounts may lack one.
    #[serde(default)]
    pub rut: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub comuna: Option<String>,
    #[serde(default)]
    pub fecha_nacimiento: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl User {
    /// Name to greet the user with: first name, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nombre
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(self.username.as_str()).filter(|u| !u.trim().is_empty()))
            .unwrap_or_else(|| self.email.as_str())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_deserializes_backend_shape() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "username": "cata",
            "email": "cata@duoc.cl",
            "rut": "12.345.678-5",
            "password": null,
            "role": "Administrador",
            "status": "activo",
            "nombre": "Catalina",
            "apellidos": "Rojas",
            "fechaNacimiento": "1999-03-21",
            "createdAt": "2024-05-01T12:30:00"
        }))
        .unwrap();

        assert_eq!(user.id, UserId::new(7));
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_active());
        assert_eq!(
            user.fecha_nacimiento,
            Some(NaiveDate::from_ymd_opt(1999, 3, 21).unwrap())
        );
        assert_eq!(user.display_name(), "Catalina");
    }

    #[test]
    fn test_minimal_user_defaults() {
        let user: User =
            serde_json::from_value(json!({ "id": 1, "email": "a@gmail.com" })).unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.status, AccountStatus::Active);
        assert_eq!(user.display_name(), "a@gmail.com");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result = serde_json::from_value::<User>(json!({
            "id": 1, "email": "a@gmail.com", "role": "root"
        }));
        assert!(result.is_err());
    }
}
