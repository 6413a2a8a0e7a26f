//! HTTP request handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod customers;
pub mod orders;
pub mod permissions;
pub mod products;
