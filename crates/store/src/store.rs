use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{
    Customer, HistoryRecord, LineItem, NewCustomer, NewNotification, NewOrder, NewProduct,
    NotificationRecord, Order, OrderUpdate, PlacedOrder, Product,
};
use crate::{CustomerId, Money, OrderId, ProductId, Result};

/// Core trait for storefront persistence.
///
/// All implementations must be thread-safe (Send + Sync). Methods that
/// write more than one row do so atomically: either every row is written
/// or none is.
#[async_trait]
pub trait Store: Send + Sync {
    // -- Customers --

    /// Inserts a customer.
    ///
    /// Fails with `DuplicateEmail` if the email is already registered.
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer>;

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Looks up a customer by exact (case-sensitive) email.
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>>;

    async fn count_customers(&self) -> Result<i64>;

    // -- Catalog --

    /// Inserts products in one transaction, returning them with their ids.
    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Returns all products ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn count_products(&self) -> Result<i64>;

    /// Changes a product's catalog price.
    ///
    /// Existing line items keep their snapshot price.
    async fn set_product_price(&self, id: ProductId, price: Money) -> Result<()>;

    // -- Orders --

    /// Inserts an order with its first line item and history record.
    async fn create_order(&self, order: NewOrder) -> Result<PlacedOrder>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns the order's line items ordered by id.
    async fn line_items(&self, order_id: OrderId) -> Result<Vec<LineItem>>;

    /// Returns the order's status history ordered by id.
    async fn history(&self, order_id: OrderId) -> Result<Vec<HistoryRecord>>;

    /// Overwrites one line item and the order header in one transaction.
    ///
    /// Fails with `NotFound` if the order or the line item (within that
    /// order) does not exist.
    async fn update_order(&self, update: OrderUpdate) -> Result<Order>;

    /// Deletes an order together with its line items, history records and
    /// notifications.
    ///
    /// Returns `false` (and changes nothing) if the order does not exist.
    async fn delete_order(&self, id: OrderId) -> Result<bool>;

    // -- Notifications --

    async fn append_notification(&self, notification: NewNotification)
    -> Result<NotificationRecord>;

    async fn notifications(&self, order_id: OrderId) -> Result<Vec<NotificationRecord>>;

    // -- Aggregates --

    /// Returns orders created at or after `since`, oldest first.
    async fn orders_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>>;

    /// Counts orders created at or after `since`.
    async fn count_orders_since(&self, since: DateTime<Utc>) -> Result<i64>;

    /// Sums quantity times unit price over every stored line item.
    async fn lifetime_sales(&self) -> Result<Money>;
}

/// Extension trait providing convenience lookups for stores.
#[async_trait]
pub trait StoreExt: Store {
    /// Loads an order, failing with `NotFound` if it does not exist.
    async fn require_order(&self, id: OrderId) -> Result<Order> {
        self.get_order(id)
            .await?
            .ok_or(crate::StoreError::NotFound {
                entity: "Order",
                id: id.as_i64(),
            })
    }

    /// Loads a product, failing with `NotFound` if it does not exist.
    async fn require_product(&self, id: ProductId) -> Result<Product> {
        self.get_product(id)
            .await?
            .ok_or(crate::StoreError::NotFound {
                entity: "Product",
                id: id.as_i64(),
            })
    }
}

// Blanket implementation for all Store implementations
impl<T: Store + ?Sized> StoreExt for T {}
