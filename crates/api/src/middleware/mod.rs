//! Request extractors for authentication and authorization.
//!
//! - [`auth::AuthUser`]: the caller behind a valid Bearer token.
//! - [`rbac::RequireAdmin`]: the caller must hold the `admin` role.
//! - [`permission::RequirePermission`]: the caller must hold the route's screen grant.

pub mod auth;
pub mod permission;
pub mod rbac;
