//! Shared application state.

use std::sync::Arc;

use domain::{AuthService, CatalogService, DashboardService, OrderService};
use store::Store;

use crate::config::Config;
use crate::session::SessionStore;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub auth: AuthService<S>,
    pub orders: OrderService<S>,
    pub dashboard: DashboardService<S>,
    pub catalog: CatalogService<S>,
    pub sessions: SessionStore,
}

impl<S: Store + Clone + 'static> AppState<S> {
    /// Wires every service to `store` using the settings in `config`.
    pub fn new(store: S, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            auth: AuthService::new(store.clone()),
            orders: OrderService::new(store.clone(), config.admin_customer_id),
            dashboard: DashboardService::new(store.clone(), config.dashboard_window()),
            catalog: CatalogService::new(store),
            sessions: SessionStore::new(config.session_ttl()),
        })
    }
}
