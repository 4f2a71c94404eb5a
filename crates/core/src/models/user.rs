//! User records and the bodies that create or change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, Role, SellerStatus, UserId};

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub role: Role,
    /// Seller-request status; absent until the user first asks to sell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SellerStatus>,
    pub created_at: DateTime<Utc>,
}

/// Role and seller-request status of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub role: Role,
    #[serde(default)]
    pub status: Option<SellerStatus>,
}

/// Profile data supplied on first sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Body of `POST /jwt`.
///
/// Extra fields sent by the identity provider are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPayload {
    pub email: Email,
}

/// Body of an admin role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_names() {
        let user = User {
            id: UserId::new(1),
            email: Email::parse("fern@example.com").unwrap(),
            display_name: Some("Fern".to_string()),
            photo_url: None,
            role: Role::Customer,
            status: None,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["displayName"], "Fern");
        assert!(json["photoURL"].is_null());
        assert_eq!(json["role"], "customer");
        assert!(json.get("status").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_identity_payload_ignores_extra_fields() {
        let payload: IdentityPayload =
            serde_json::from_str(r#"{"email":"fern@example.com","name":"Fern"}"#).unwrap();
        assert_eq!(payload.email.as_str(), "fern@example.com");
    }

    #[test]
    fn test_identity_payload_rejects_bad_email() {
        assert!(serde_json::from_str::<IdentityPayload>(r#"{"email":"nope"}"#).is_err());
    }
}
