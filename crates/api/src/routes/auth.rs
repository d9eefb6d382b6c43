//! Login, logout and registration pages.

use std::sync::Arc;

use axum::extract::{Extension, Form, State};
use axum::Json;
use domain::Registration;
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ApiError;
use crate::session::{Flash, Notice, SessionContext};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(rename = "senha", default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "senha", default)]
    pub password: String,
    #[serde(rename = "confirmar_senha", default)]
    pub confirm: String,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "endereco_entrega")]
    pub delivery_address: Option<String>,
}

impl From<RegisterForm> for Registration {
    fn from(form: RegisterForm) -> Self {
        Registration {
            name: form.name,
            email: form.email,
            password: form.password,
            confirm: form.confirm,
            phone: form.phone,
            delivery_address: form.delivery_address,
        }
    }
}

/// Login and registration views only carry the pending notices.
#[derive(Serialize)]
pub struct FormView {
    pub page: &'static str,
    pub signed_in: bool,
    pub notices: Vec<Notice>,
}

/// GET /: login form.
pub async fn login_page(Extension(session): Extension<SessionContext>) -> Json<FormView> {
    Json(FormView {
        page: "login",
        signed_in: session.customer_id().is_some(),
        notices: session.take_notices().await,
    })
}

/// POST /: checks credentials and signs the customer in under a new
/// session token.
#[tracing::instrument(skip_all)]
pub async fn login<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Form(form): Form<LoginForm>,
) -> Result<Flash, ApiError> {
    let customer = state
        .auth
        .login(&form.email, &form.password)
        .await
        .map_err(ApiError::back_to("/"))?;

    Ok(Flash::success("Signed in successfully", "/home").sign_in(customer.id))
}

/// GET /logout: forgets the signed-in customer.
pub async fn logout() -> Flash {
    Flash::info("You have been signed out", "/").sign_out()
}

/// GET /cadastro: registration form.
pub async fn register_page(Extension(session): Extension<SessionContext>) -> Json<FormView> {
    Json(FormView {
        page: "register",
        signed_in: session.customer_id().is_some(),
        notices: session.take_notices().await,
    })
}

/// POST /cadastro: creates a customer account.
#[tracing::instrument(skip_all)]
pub async fn register<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Form(form): Form<RegisterForm>,
) -> Result<Flash, ApiError> {
    state
        .auth
        .register(form.into())
        .await
        .map_err(ApiError::back_to("/cadastro"))?;

    Ok(Flash::success("Registration complete, please sign in", "/"))
}
