//! Account roles, capabilities and statuses.
//!
//! The backend stores roles and statuses as free-form Spanish strings
//! (`"cliente"`, `"Administrador"`, `"activo"`, ...). These enums parse those
//! strings once, case-insensitively, so an unknown role is an error at the
//! boundary rather than a comparison that silently evaluates to false.
//!
//! Role checks on the client are advisory: the backend remains the authority.

use serde::{Deserialize, Serialize};

/// Error returned when a role or status string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    /// Unrecognized role name.
    #[error("invalid role: {0}")]
    UnknownRole(String),
    /// Unrecognized account status.
    #[error("invalid account status: {0}")]
    UnknownStatus(String),
}

/// Something a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Add products to a cart and check out.
    Purchase,
    /// Create, edit and delete catalog products.
    ManageProducts,
    /// Create, edit and delete user accounts.
    ManageUsers,
    /// View the admin dashboard and statistics.
    ViewDashboard,
}

/// User role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    /// Regular customer.
    #[default]
    #[serde(rename = "cliente")]
    Customer,
    /// Store clerk with catalog access.
    #[serde(rename = "vendedor")]
    Seller,
    /// Store administrator.
    #[serde(rename = "admin")]
    Admin,
    /// Full access including user management.
    SuperAdmin,
}

impl Role {
    /// All roles, from least to most privileged.
    pub const ALL: [Self; 4] = [Self::Customer, Self::Seller, Self::Admin, Self::SuperAdmin];

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "cliente",
            Self::Seller => "vendedor",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Whether this role grants `capability`.
    #[must_use]
    pub const fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::Purchase => true,
            Capability::ManageProducts => {
                matches!(self, Self::Seller | Self::Admin | Self::SuperAdmin)
            }
            Capability::ManageUsers | Capability::ViewDashboard => {
                matches!(self, Self::Admin | Self::SuperAdmin)
            }
        }
    }

    /// Whether the role lands on the admin area after login.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.can(Capability::ViewDashboard)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cliente" => Ok(Self::Customer),
            "vendedor" => Ok(Self::Seller),
            "admin" | "administrador" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(RoleError::UnknownRole(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = RoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Whether an account may log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum AccountStatus {
    /// Account in good standing.
    #[default]
    #[serde(rename = "activo")]
    Active,
    /// Disabled account.
    #[serde(rename = "inactivo")]
    Inactive,
}

impl AccountStatus {
    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "activo",
            Self::Inactive => "inactivo",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "activo" => Ok(Self::Active),
            "inactivo" => Ok(Self::Inactive),
            _ => Err(RoleError::UnknownStatus(s.to_owned())),
        }
    }
}

impl TryFrom<String> for AccountStatus {
    type Error = RoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Cliente".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("VENDEDOR".parse::<Role>().unwrap(), Role::Seller);
        assert_eq!("Administrador".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
    }

    #[test]
    fn test_role_parse_unknown() {
        assert_eq!(
            "gerente".parse::<Role>(),
            Err(RoleError::UnknownRole("gerente".to_string()))
        );
    }

    #[test]
    fn test_role_roundtrip_through_display() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"cliente\"");
        let role: Role = serde_json::from_str("\"Administrador\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(Role::Customer.can(Capability::Purchase));
        assert!(!Role::Customer.can(Capability::ManageProducts));
        assert!(!Role::Customer.can(Capability::ManageUsers));

        assert!(Role::Seller.can(Capability::ManageProducts));
        assert!(!Role::Seller.can(Capability::ManageUsers));

        assert!(Role::Admin.can(Capability::ManageUsers));
        assert!(Role::SuperAdmin.can(Capability::ViewDashboard));
    }

    #[test]
    fn test_is_staff() {
        assert!(!Role::Customer.is_staff());
        assert!(!Role::Seller.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(Role::SuperAdmin.is_staff());
    }

    #[test]
    fn test_account_status() {
        assert_eq!("Activo".parse::<AccountStatus>().unwrap(), AccountStatus::Active);
        assert_eq!(
            serde_json::to_string(&AccountStatus::Inactive).unwrap(),
            "\"inactivo\""
        );
        let status: AccountStatus = serde_json::from_str("\"INACTIVO\"").unwrap();
        assert_eq!(status, AccountStatus::Inactive);
        assert!("bloqueado".parse::<AccountStatus>().is_err());
    }
}
