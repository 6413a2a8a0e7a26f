//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-row writes run inside a
//! single transaction and roll back on drop when an error propagates.

pub mod customer_repo;
pub mod order_repo;
pub mod permission_repo;
pub mod product_repo;
pub mod user_repo;

pub use customer_repo::CustomerRepo;
pub use order_repo::OrderRepo;
pub use permission_repo::{PermissionRepo, PgGrantStore};
pub use product_repo::ProductRepo;
pub use user_repo::UserRepo;
