//! Role-based access policies.
//!
//! One closed set of policies drives both server-side endpoint authorization
//! and client-side dashboard routing, so a role decision is never a string
//! comparison.

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Which roles may use a route or endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Admins only (user management, statistics).
    AdminOnly,
    /// Sellers and admins (inventory, fulfilment).
    SellerOrAdmin,
    /// Sellers only.
    SellerOnly,
    /// Customers only (seller request, purchase history pages).
    CustomerOnly,
    /// Any user with a stored role.
    AnyRole,
}

impl AccessPolicy {
    /// Whether `role` satisfies this policy.
    #[must_use]
    pub const fn allows(self, role: Role) -> bool {
        match self {
            Self::AnyRole => true,
            Self::AdminOnly => match role {
                Role::Admin => true,
                Role::Customer | Role::Seller => false,
            },
            Self::SellerOrAdmin => match role {
                Role::Seller | Role::Admin => true,
                Role::Customer => false,
            },
            Self::SellerOnly => match role {
                Role::Seller => true,
                Role::Customer | Role::Admin => false,
            },
            Self::CustomerOnly => match role {
                Role::Customer => true,
                Role::Seller | Role::Admin => false,
            },
        }
    }

    /// Whether a caller with an optional stored role is allowed.
    ///
    /// A missing role means no user record, which never grants access.
    #[must_use]
    pub const fn allows_opt(self, role: Option<Role>) -> bool {
        match role {
            Some(role) => self.allows(role),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 3] = [Role::Customer, Role::Seller, Role::Admin];

    fn allowed(policy: AccessPolicy) -> Vec<Role> {
        ALL_ROLES
            .into_iter()
            .filter(|role| policy.allows(*role))
            .collect()
    }

    #[test]
    fn test_policy_matrix() {
        assert_eq!(allowed(AccessPolicy::AdminOnly), vec![Role::Admin]);
        assert_eq!(
            allowed(AccessPolicy::SellerOrAdmin),
            vec![Role::Seller, Role::Admin]
        );
        assert_eq!(allowed(AccessPolicy::SellerOnly), vec![Role::Seller]);
        assert_eq!(allowed(AccessPolicy::CustomerOnly), vec![Role::Customer]);
        assert_eq!(allowed(AccessPolicy::AnyRole), ALL_ROLES.to_vec());
    }

    #[test]
    fn test_missing_role_never_allowed() {
        assert!(!AccessPolicy::AnyRole.allows_opt(None));
        assert!(!AccessPolicy::AdminOnly.allows_opt(None));
        assert!(AccessPolicy::AdminOnly.allows_opt(Some(Role::Admin)));
    }
}
