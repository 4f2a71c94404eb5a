//! HTTP middleware and extractors for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. CORS (credentialed requests from the configured origins)
//! 6. Rate limiting (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{AdminOnly, Identity, RequireAuth, RequireRole, RolePolicy, SellerOrAdmin};
pub use rate_limit::{api_rate_limiter, token_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
