//! Order lifecycle: placement, in-place edits and deletion.

mod commands;
mod service;

pub use commands::{CreateOrder, EditOrder};
pub use service::{EditView, OrderDetails, OrderService};

/// Status recorded as the "previous" status of a freshly placed order.
pub const STATUS_CREATED: &str = "Created";

/// Status of an order right after placement.
pub const STATUS_IN_PROGRESS: &str = "In progress";
