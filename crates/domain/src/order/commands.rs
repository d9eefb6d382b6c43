//! Order commands.

use common::{CustomerId, OrderId, ProductId};

/// Place a new order with one line item.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The authenticated customer, `None` when no one is logged in.
    pub customer_id: Option<CustomerId>,
    pub product_id: ProductId,
    pub quantity: u32,
    pub note: String,
}

impl CreateOrder {
    pub fn new(customer_id: CustomerId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            customer_id: Some(customer_id),
            product_id,
            quantity,
            note: String::new(),
        }
    }

    /// Sets the free-text note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Edit the first line item of an order and, for the privileged identity,
/// its status.
#[derive(Debug, Clone)]
pub struct EditOrder {
    pub order_id: OrderId,
    /// The customer performing the edit.
    pub actor: CustomerId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub note: String,
    /// Ignored unless `actor` is the privileged identity.
    pub status: Option<String>,
}

impl EditOrder {
    pub fn new(
        order_id: OrderId,
        actor: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Self {
        Self {
            order_id,
            actor,
            product_id,
            quantity,
            note: String::new(),
            status: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}
