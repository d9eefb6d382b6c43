//! API error types with flash-and-redirect response mapping.

use axum::response::{IntoResponse, Response};
use domain::DomainError;
use thiserror::Error;

use crate::session::Flash;

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// API-level error type.
///
/// Every failure is rendered as a redirect carrying a danger notice. The
/// redirect target depends on the error: missing sign-in goes to the login
/// page, a missing order goes to the dashboard, and input problems go back
/// to the form that submitted them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain failure, with the page to return to for input errors.
    #[error("{error}")]
    Domain {
        error: DomainError,
        back_to: String,
    },
    /// Malformed request input.
    #[error("{message}")]
    BadRequest { message: String, back_to: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, back_to: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            back_to: back_to.into(),
        }
    }

    /// Returns a closure that wraps a domain error with the form page it
    /// came from, for use with `map_err`.
    pub fn back_to(page: impl Into<String>) -> impl FnOnce(DomainError) -> Self {
        let back_to = page.into();
        move |error| ApiError::Domain { error, back_to }
    }

    /// Target path and message of the redirect.
    fn redirect(&self) -> (&str, String) {
        match self {
            ApiError::BadRequest { message, back_to } => (back_to.as_str(), message.clone()),
            ApiError::Domain { error, back_to } => match error {
                DomainError::AuthRequired => ("/", error.to_string()),
                DomainError::NotFound { entity, .. } if *entity == "Order" => {
                    ("/home", error.to_string())
                }
                DomainError::NotFound { .. }
                | DomainError::Validation(_)
                | DomainError::InvalidCredentials => (back_to.as_str(), error.to_string()),
                DomainError::Store(_) | DomainError::PasswordHash(_) => {
                    ("/home", GENERIC_FAILURE.to_string())
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Domain {
            error: error @ (DomainError::Store(_) | DomainError::PasswordHash(_)),
            ..
        } = &self
        {
            tracing::error!(error = %error, "internal server error");
        }

        let (to, message) = self.redirect();
        Flash::danger(message, to).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApiError::Domain {
            error,
            back_to: "/home".to_string(),
        }
    }
}
