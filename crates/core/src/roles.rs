//! Well-known role name constants.
//!
//! Roles beyond these two are allowed as long as the role grant table knows
//! them (see [`crate::provisioning`]).

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Whether `role` carries the administrative override.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}
