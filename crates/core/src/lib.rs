//! Domain building blocks for the bizdesk backend.
//!
//! Everything here is free of HTTP and storage concerns so it can be shared by
//! the repository layer, the API server, and tests.

pub mod authz;
pub mod catalog;
pub mod error;
pub mod matrix;
pub mod order;
pub mod pagination;
pub mod permissions;
pub mod provisioning;
pub mod roles;
pub mod screens;
pub mod types;
