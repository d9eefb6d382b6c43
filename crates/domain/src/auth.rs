//! Customer registration and credential checks.
//!
//! Session state lives in the HTTP layer; this service only answers
//! "who is this" and "create this customer".

use store::{Customer, NewCustomer, Store};

use crate::error::DomainError;
use crate::password::{hash_password, verify_password};

/// Input of the registration form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub phone: Option<String>,
    pub delivery_address: Option<String>,
}

/// Service for customer authentication.
pub struct AuthService<S: Store> {
    store: S,
}

impl<S: Store> AuthService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Checks an email/password pair.
    ///
    /// The email must match exactly and the password must verify against the
    /// stored hash. Unknown emails and wrong passwords yield the same error.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Customer, DomainError> {
        let Some(customer) = self.store.find_customer_by_email(email).await? else {
            metrics::counter!("logins_total", "outcome" => "rejected").increment(1);
            return Err(DomainError::InvalidCredentials);
        };

        if !verify_password(password, &customer.password_hash)? {
            metrics::counter!("logins_total", "outcome" => "rejected").increment(1);
            return Err(DomainError::InvalidCredentials);
        }

        metrics::counter!("logins_total", "outcome" => "accepted").increment(1);
        tracing::info!(customer_id = %customer.id, "customer logged in");
        Ok(customer)
    }

    /// Registers a new customer.
    ///
    /// Fails without writing anything if the passwords differ or the email
    /// is already registered.
    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<Customer, DomainError> {
        if registration.email.trim().is_empty() {
            return Err(DomainError::validation("Email is required"));
        }
        if registration.password.is_empty() {
            return Err(DomainError::validation("Password is required"));
        }
        if registration.password != registration.confirm {
            return Err(DomainError::validation("Passwords do not match"));
        }
        if self
            .store
            .find_customer_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(DomainError::validation("Email already in use"));
        }

        let password_hash = hash_password(&registration.password)?;
        let customer = self
            .store
            .insert_customer(NewCustomer {
                name: registration.name,
                email: registration.email,
                phone: non_blank(registration.phone),
                delivery_address: non_blank(registration.delivery_address),
                password_hash,
            })
            .await?;

        metrics::counter!("registrations_total").increment(1);
        tracing::info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
