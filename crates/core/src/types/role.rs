//! User roles and seller-request status.

use serde::{Deserialize, Serialize};

/// A user's stored role.
///
/// Every user starts as a `Customer`; sellers are promoted by an admin after
/// requesting it, admins are bootstrapped from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "plantnet.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    Seller,
    Admin,
}

impl Role {
    /// Dashboard landing route for this role.
    #[must_use]
    pub const fn landing_route(self) -> &'static str {
        match self {
            Self::Customer => "/dashboard/my-orders",
            Self::Seller | Self::Admin => "/dashboard",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Seller => write!(f, "seller"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Progress of a customer's request to become a seller.
///
/// Stored as a nullable column; `None` means the user never asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "plantnet.seller_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SellerStatus {
    /// Waiting for an admin decision.
    Requested,
    /// Promoted to seller.
    Accepted,
    /// Declined; the user may ask again.
    Rejected,
}

impl SellerStatus {
    /// Whether a user in `status` may file a new seller request.
    #[must_use]
    pub const fn can_request(status: Option<Self>) -> bool {
        !matches!(status, Some(Self::Requested))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_str() {
        for role in [Role::Customer, Role::Seller, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_json() {
        assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
    }

    #[test]
    fn test_pending_request_blocks_new_request() {
        assert!(SellerStatus::can_request(None));
        assert!(SellerStatus::can_request(Some(SellerStatus::Rejected)));
        assert!(SellerStatus::can_request(Some(SellerStatus::Accepted)));
        assert!(!SellerStatus::can_request(Some(SellerStatus::Requested)));
    }
}
