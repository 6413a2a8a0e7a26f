//! Row types and request DTOs.

pub mod customer;
pub mod order;
pub mod permission;
pub mod product;
pub mod user;
