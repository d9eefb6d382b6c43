//! Shared types used across the storefront crates.

mod ids;
mod money;

pub use ids::{CustomerId, HistoryId, LineItemId, NotificationId, OrderId, ProductId};
pub use money::Money;
