//! Session user context.
//!
//! The portal's auth layer is out of scope here; consumers hand the
//! notification subsystem a resolved [`CurrentUser`] instead of reading
//! ambient session state.

use serde::{Deserialize, Serialize};

/// Portal roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// System administrator.
    Admin,
    /// Registration-branch employee.
    BranchEmployee,
    /// Ship owner using the self-service portal.
    ShipOwner,
}

impl UserRole {
    /// String form as stored by the portal.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::BranchEmployee => "branch_employee",
            Self::ShipOwner => "ship_owner",
        }
    }

    /// Whether this role may create notifications for other users.
    #[must_use]
    pub const fn can_create_notifications(self) -> bool {
        matches!(self, Self::Admin | Self::BranchEmployee)
    }
}

/// The authenticated user a component acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User ID.
    pub id: String,
    /// Portal role.
    pub role: UserRole,
}

impl CurrentUser {
    /// Create a user context.
    #[must_use]
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_strings() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::BranchEmployee.as_str(), "branch_employee");
        assert_eq!(UserRole::ShipOwner.as_str(), "ship_owner");
    }

    #[test]
    fn test_create_permission() {
        assert!(UserRole::Admin.can_create_notifications());
        assert!(UserRole::BranchEmployee.can_create_notifications());
        assert!(!UserRole::ShipOwner.can_create_notifications());
    }
}
