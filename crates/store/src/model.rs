//! Row types for the storefront tables.
//!
//! Relationships are plain foreign-key fields. An [`Order`] owns its line
//! items, history records and notifications; a [`Customer`] does not own
//! its orders.

use chrono::{DateTime, Utc};
use common::{CustomerId, HistoryId, LineItemId, Money, NotificationId, OrderId, ProductId};
use serde::Serialize;

/// A registered customer.
///
/// `password_hash` is an Argon2 PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub delivery_address: Option<String>,
    pub password_hash: String,
}

/// Fields for inserting a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub delivery_address: Option<String>,
    pub password_hash: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
}

/// Fields for inserting a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
        }
    }
}

/// An order header.
///
/// `total` is derived from the order's line items by the write paths that
/// change them; nothing else keeps it in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub note: String,
    pub total: Money,
}

/// A line item of an order.
///
/// `unit_price` is a snapshot taken when the item was written, not a live
/// lookup of the product price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItem {
    /// Returns quantity times the snapshot unit price.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A recorded status transition of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub id: HistoryId,
    pub order_id: OrderId,
    pub previous_status: String,
    pub new_status: String,
    pub changed_at: DateTime<Utc>,
}

/// A message tied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub order_id: OrderId,
    pub kind: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    pub previous_status: String,
    pub new_status: String,
}

/// Everything written when an order is placed.
///
/// The order header, its first line item and its first history record are
/// inserted in a single transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub note: String,
    pub total: Money,
    pub item: NewLineItem,
    pub history: NewHistoryRecord,
}

/// Replacement values for one existing line item.
#[derive(Debug, Clone)]
pub struct LineItemUpdate {
    pub id: LineItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

/// An in-place edit of an order, applied in one transaction.
///
/// `status` is `None` when the status is left untouched.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub order_id: OrderId,
    pub item: LineItemUpdate,
    pub note: String,
    pub total: Money,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub order_id: OrderId,
    pub kind: String,
    pub message: String,
}

/// The rows written by [`crate::Store::create_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: Order,
    pub item: LineItem,
    pub history: HistoryRecord,
}
