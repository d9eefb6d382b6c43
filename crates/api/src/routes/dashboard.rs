//! Dashboard page.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use common::CustomerId;
use domain::DashboardSummary;
use serde::Serialize;
use store::Store;

use crate::error::ApiError;
use crate::session::{Notice, SessionContext};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HomeView {
    pub customer_id: CustomerId,
    pub window_days: i64,
    #[serde(flatten)]
    pub summary: DashboardSummary,
    pub notices: Vec<Notice>,
}

/// GET|POST /home: recent orders and store-wide figures.
///
/// Store failures never surface here; the summary degrades to zeros.
#[tracing::instrument(skip_all)]
pub async fn home<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<HomeView>, ApiError> {
    let customer_id = session.require_customer()?;
    let summary = state.dashboard.summary().await;

    Ok(Json(HomeView {
        customer_id,
        window_days: state.dashboard.window().num_days(),
        summary,
        notices: session.take_notices().await,
    }))
}
