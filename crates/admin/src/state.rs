//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use larder_core::permission::PermissionGate;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    gate: PermissionGate,
}

impl AppState {
    /// Create the state, building the permission gate from the configured
    /// superuser patterns.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let gate = PermissionGate::new(config.superusers.clone());
        Self {
            inner: Arc::new(AppStateInner { config, pool, gate }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the permission gate.
    #[must_use]
    pub fn gate(&self) -> &PermissionGate {
        &self.inner.gate
    }
}
