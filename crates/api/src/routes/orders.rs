//! Order create, edit and delete pages.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::{Extension, Form, Path, State};
use common::{OrderId, ProductId};
use domain::{CreateOrder, EditOrder, EditView};
use serde::{Deserialize, Serialize};
use store::{Product, Store};

use crate::error::ApiError;
use crate::session::{Flash, Notice, SessionContext};
use crate::state::AppState;

// -- Request types --

/// Fields shared by the create and edit forms.
#[derive(Debug, Deserialize)]
pub struct OrderForm {
    #[serde(rename = "produto_id")]
    pub product_id: ProductId,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "observacao", default)]
    pub note: String,
    /// Only honoured for the privileged customer.
    #[serde(rename = "status_pedido")]
    pub status: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CreateOrderView {
    pub products: Vec<Product>,
    pub notices: Vec<Notice>,
}

#[derive(Serialize)]
pub struct EditOrderView {
    #[serde(flatten)]
    pub view: EditView,
    pub notices: Vec<Notice>,
}

// -- Handlers --

/// GET /criar_pedido: catalog for the order form.
#[tracing::instrument(skip_all)]
pub async fn create_page<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<CreateOrderView>, ApiError> {
    session.require_customer()?;
    let products = state.catalog.list_products().await?;

    Ok(Json(CreateOrderView {
        products,
        notices: session.take_notices().await,
    }))
}

/// POST /criar_pedido: places a single-item order for the signed-in
/// customer.
#[tracing::instrument(skip_all)]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<SessionContext>,
    form: Result<Form<OrderForm>, FormRejection>,
) -> Result<Flash, ApiError> {
    const PAGE: &str = "/criar_pedido";

    let customer_id = session.require_customer()?;
    let Form(form) = parse_form(form, PAGE)?;

    let cmd = CreateOrder::new(customer_id, form.product_id, form.quantity).with_note(form.note);
    state
        .orders
        .create_order(cmd)
        .await
        .map_err(ApiError::back_to(PAGE))?;

    Ok(Flash::success("Order created successfully", "/home"))
}

/// GET /editar_pedido/{id}: the order with the catalog to pick from.
#[tracing::instrument(skip_all)]
pub async fn edit_page<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<SessionContext>,
    path: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<EditOrderView>, ApiError> {
    let actor = session.require_customer()?;
    let order_id = parse_order_id(path)?;

    let view = state.orders.edit_view(order_id, actor).await?;

    Ok(Json(EditOrderView {
        view,
        notices: session.take_notices().await,
    }))
}

/// POST /editar_pedido/{id}: rewrites the order's first line item, its
/// note, and (for the privileged customer) its status.
#[tracing::instrument(skip_all)]
pub async fn edit<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<SessionContext>,
    path: Result<Path<OrderId>, PathRejection>,
    form: Result<Form<OrderForm>, FormRejection>,
) -> Result<Flash, ApiError> {
    let actor = session.require_customer()?;
    let order_id = parse_order_id(path)?;
    let page = format!("/editar_pedido/{order_id}");
    let Form(form) = parse_form(form, &page)?;

    let mut cmd =
        EditOrder::new(order_id, actor, form.product_id, form.quantity).with_note(form.note);
    if let Some(status) = form.status {
        cmd = cmd.with_status(status);
    }

    state
        .orders
        .edit_order(cmd)
        .await
        .map_err(ApiError::back_to(page))?;

    Ok(Flash::success("Order updated successfully", "/home"))
}

/// POST /excluir_pedido/{id}: removes the order and everything it owns.
#[tracing::instrument(skip_all)]
pub async fn delete<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<SessionContext>,
    path: Result<Path<OrderId>, PathRejection>,
) -> Result<Flash, ApiError> {
    session.require_customer()?;
    let order_id = parse_order_id(path)?;

    state.orders.delete_order(order_id).await?;

    Ok(Flash::success("Order deleted successfully", "/home"))
}

fn parse_order_id(path: Result<Path<OrderId>, PathRejection>) -> Result<OrderId, ApiError> {
    path.map(|Path(id)| id).map_err(|e| {
        tracing::debug!(error = %e, "rejected order id");
        ApiError::bad_request("Order not found", "/home")
    })
}

fn parse_form(
    form: Result<Form<OrderForm>, FormRejection>,
    page: &str,
) -> Result<Form<OrderForm>, ApiError> {
    form.map_err(|e| {
        tracing::debug!(error = %e, "rejected order form");
        ApiError::bad_request("Choose a product and a whole-number quantity", page)
    })
}
