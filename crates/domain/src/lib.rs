//! Domain layer for the storefront.
//!
//! This crate provides the services the HTTP layer calls into:
//! - `AuthService` for registration and credential checks
//! - `OrderService` for creating, editing and deleting orders
//! - `DashboardService` for the recent-sales summary
//! - `CatalogService` for listing and seeding products

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod order;
pub mod password;

pub use auth::{AuthService, Registration};
pub use catalog::{CatalogService, default_catalog};
pub use dashboard::{DEFAULT_WINDOW_DAYS, DashboardService, DashboardSummary, RecentOrder};
pub use error::DomainError;
pub use order::{
    CreateOrder, EditOrder, EditView, OrderDetails, OrderService, STATUS_CREATED,
    STATUS_IN_PROGRESS,
};
