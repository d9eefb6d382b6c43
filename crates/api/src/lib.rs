//! HTTP server for the storefront.
//!
//! Serves the login, registration, dashboard and order pages over
//! cookie-backed sessions, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// Page routes run behind the session middleware; `/health` and `/metrics`
/// do not, so probes and scrapers never start sessions.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let sessions = state.sessions.clone();

    let pages = Router::new()
        .route(
            "/",
            get(routes::auth::login_page).post(routes::auth::login::<S>),
        )
        .route("/logout", get(routes::auth::logout))
        .route(
            "/cadastro",
            get(routes::auth::register_page).post(routes::auth::register::<S>),
        )
        .route(
            "/home",
            get(routes::dashboard::home::<S>).post(routes::dashboard::home::<S>),
        )
        .route(
            "/criar_pedido",
            get(routes::orders::create_page::<S>).post(routes::orders::create::<S>),
        )
        .route(
            "/editar_pedido/{id}",
            get(routes::orders::edit_page::<S>).post(routes::orders::edit::<S>),
        )
        .route("/excluir_pedido/{id}", post(routes::orders::delete::<S>))
        .route("/produtos", get(routes::products::list::<S>))
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            sessions,
            session::middleware,
        ));

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(pages)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
