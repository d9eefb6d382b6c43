//! Relational persistence for the storefront.
//!
//! The [`Store`] trait is the seam between the domain services and the
//! database. Two implementations are provided:
//! - [`PostgresStore`] backed by a sqlx connection pool
//! - [`InMemoryStore`] for tests and database-less local runs
//!
//! Every multi-row write (order creation, order edit, order deletion) is a
//! single transaction in both implementations.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use common::{CustomerId, HistoryId, LineItemId, Money, NotificationId, OrderId, ProductId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use model::{
    Customer, HistoryRecord, LineItem, LineItemUpdate, NewCustomer, NewHistoryRecord,
    NewLineItem, NewNotification, NewOrder, NewProduct, NotificationRecord, Order, OrderUpdate,
    PlacedOrder, Product,
};
pub use postgres::PostgresStore;
pub use store::{Store, StoreExt};
