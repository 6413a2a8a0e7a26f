use std::sync::Arc;

use bizdesk_core::provisioning::RoleGrantTable;
use bizdesk_db::repositories::PgGrantStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the rest sits
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bizdesk_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Default grants seeded for each role at user creation.
    pub role_grants: Arc<RoleGrantTable>,
}

impl AppState {
    /// Grant store for authorization decisions.
    pub fn grant_store(&self) -> PgGrantStore {
        PgGrantStore::new(self.pool.clone())
    }
}
