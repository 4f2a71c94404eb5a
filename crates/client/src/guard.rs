//! Dashboard route guards.
//!
//! A guard turns the signed-in state and the role lookup into one of three
//! outcomes. While the role is still loading the page shows a placeholder
//! instead of flashing a redirect.

use plantnet_core::models::RoleInfo;
use plantnet_core::{AccessPolicy, Role};

/// Sign-in page.
pub const LOGIN_ROUTE: &str = "/login";

/// Dashboard home; where a user with a role lands when a page is not for them.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// What the guard knows about the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    /// Sign-in or role lookup still in flight.
    Loading,
    /// No session.
    SignedOut,
    /// Signed in; `None` when no user record exists yet.
    Resolved(Option<Role>),
}

impl RoleState {
    /// State after a finished `GET /user/role/{email}` lookup.
    #[must_use]
    pub fn from_lookup(info: Option<RoleInfo>) -> Self {
        Self::Resolved(info.map(|info| info.role))
    }
}

/// What to do with a guarded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show a loading placeholder.
    Placeholder,
    /// Render the page.
    Render,
    /// Navigate elsewhere, replacing the history entry.
    Redirect(&'static str),
}

/// Guard for a group of dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    policy: AccessPolicy,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    /// Users page and statistics.
    #[must_use]
    pub const fn admin() -> Self {
        Self::new(AccessPolicy::AdminOnly)
    }

    /// Inventory and order management.
    #[must_use]
    pub const fn seller() -> Self {
        Self::new(AccessPolicy::SellerOrAdmin)
    }

    /// Any page that only needs a session.
    #[must_use]
    pub const fn signed_in() -> Self {
        Self::new(AccessPolicy::AnyRole)
    }

    #[must_use]
    pub const fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Decide what to do with a visit in `state`.
    #[must_use]
    pub const fn decide(&self, state: RoleState) -> GuardDecision {
        match state {
            RoleState::Loading => GuardDecision::Placeholder,
            // Without a user record the dashboard itself is off limits, so
            // sending it there would bounce back here.
            RoleState::SignedOut | RoleState::Resolved(None) => {
                GuardDecision::Redirect(LOGIN_ROUTE)
            }
            RoleState::Resolved(Some(role)) => {
                if self.policy.allows(role) {
                    GuardDecision::Render
                } else {
                    GuardDecision::Redirect(DASHBOARD_ROUTE)
                }
            }
        }
    }
}

/// Landing page after sign-in for a resolved role.
#[must_use]
pub const fn landing_route(role: Option<Role>) -> &'static str {
    match role {
        Some(role) => role.landing_route(),
        None => LOGIN_ROUTE,
    }
}
