//! Public catalog listing.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use serde::Serialize;
use store::{Product, Store};

use crate::error::ApiError;
use crate::session::{Notice, SessionContext};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProductsView {
    pub products: Vec<Product>,
    pub notices: Vec<Notice>,
}

/// GET /produtos: every product, ordered by id.
#[tracing::instrument(skip_all)]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<ProductsView>, ApiError> {
    let products = state
        .catalog
        .list_products()
        .await
        .map_err(ApiError::back_to("/"))?;

    Ok(Json(ProductsView {
        products,
        notices: session.take_notices().await,
    }))
}
