use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::model::{
    Customer, HistoryRecord, LineItem, NewCustomer, NewLineItem, NewNotification, NewOrder,
    NewProduct, NotificationRecord, Order, OrderUpdate, PlacedOrder, Product,
};
use crate::store::Store;
use crate::{
    CustomerId, HistoryId, LineItemId, Money, NotificationId, OrderId, ProductId, Result,
    StoreError,
};

/// Per-table id sequences, mirroring `BIGSERIAL` columns.
#[derive(Default)]
struct Sequences {
    customer: i64,
    product: i64,
    order: i64,
    line_item: i64,
    history: i64,
    notification: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    line_items: BTreeMap<LineItemId, LineItem>,
    history: BTreeMap<HistoryId, HistoryRecord>,
    notifications: BTreeMap<NotificationId, NotificationRecord>,
    seq: Sequences,
}

/// In-memory store implementation.
///
/// All tables live behind a single lock, so every multi-row write is
/// atomic with respect to readers. Used by tests and by the server when no
/// database is configured.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of line items stored.
    pub async fn line_item_count(&self) -> usize {
        self.tables.read().await.line_items.len()
    }

    /// Returns the total number of history records stored.
    pub async fn history_count(&self) -> usize {
        self.tables.read().await.history.len()
    }

    /// Attaches another line item to an existing order.
    ///
    /// The order total is left as stored.
    pub async fn add_line_item(&self, order_id: OrderId, item: NewLineItem) -> Result<LineItem> {
        let mut tables = self.tables.write().await;

        if !tables.orders.contains_key(&order_id) {
            return Err(StoreError::NotFound {
                entity: "Order",
                id: order_id.as_i64(),
            });
        }
        if !tables.products.contains_key(&item.product_id) {
            return Err(StoreError::NotFound {
                entity: "Product",
                id: item.product_id.as_i64(),
            });
        }

        let row = LineItem {
            id: LineItemId::new(next(&mut tables.seq.line_item)),
            order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        };
        tables.line_items.insert(row.id, row.clone());
        Ok(row)
    }

    /// Clears all tables and resets the id sequences.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let mut tables = self.tables.write().await;

        if tables.customers.values().any(|c| c.email == customer.email) {
            return Err(StoreError::DuplicateEmail(customer.email));
        }

        let id = CustomerId::new(next(&mut tables.seq.customer));
        let row = Customer {
            id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            delivery_address: customer.delivery_address,
            password_hash: customer.password_hash,
        };
        tables.customers.insert(id, row.clone());
        Ok(row)
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.values().find(|c| c.email == email).cloned())
    }

    async fn count_customers(&self) -> Result<i64> {
        Ok(self.tables.read().await.customers.len() as i64)
    }

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>> {
        let mut tables = self.tables.write().await;
        let mut inserted = Vec::with_capacity(products.len());

        for product in products {
            let id = ProductId::new(next(&mut tables.seq.product));
            let row = Product {
                id,
                name: product.name,
                description: product.description,
                price: product.price,
            };
            tables.products.insert(id, row.clone());
            inserted.push(row);
        }

        Ok(inserted)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn count_products(&self) -> Result<i64> {
        Ok(self.tables.read().await.products.len() as i64)
    }

    async fn set_product_price(&self, id: ProductId, price: Money) -> Result<()> {
        let mut tables = self.tables.write().await;
        let product = tables.products.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "Product",
            id: id.as_i64(),
        })?;
        product.price = price;
        Ok(())
    }

    async fn create_order(&self, new: NewOrder) -> Result<PlacedOrder> {
        let mut tables = self.tables.write().await;

        // Foreign keys are checked before any row is written.
        if !tables.customers.contains_key(&new.customer_id) {
            return Err(StoreError::NotFound {
                entity: "Customer",
                id: new.customer_id.as_i64(),
            });
        }
        if !tables.products.contains_key(&new.item.product_id) {
            return Err(StoreError::NotFound {
                entity: "Product",
                id: new.item.product_id.as_i64(),
            });
        }

        let order = Order {
            id: OrderId::new(next(&mut tables.seq.order)),
            customer_id: new.customer_id,
            status: new.status,
            created_at: new.created_at,
            note: new.note,
            total: new.total,
        };
        let item = LineItem {
            id: LineItemId::new(next(&mut tables.seq.line_item)),
            order_id: order.id,
            product_id: new.item.product_id,
            quantity: new.item.quantity,
            unit_price: new.item.unit_price,
        };
        let history = HistoryRecord {
            id: HistoryId::new(next(&mut tables.seq.history)),
            order_id: order.id,
            previous_status: new.history.previous_status,
            new_status: new.history.new_status,
            changed_at: new.created_at,
        };

        tables.orders.insert(order.id, order.clone());
        tables.line_items.insert(item.id, item.clone());
        tables.history.insert(history.id, history.clone());

        Ok(PlacedOrder {
            order,
            item,
            history,
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn line_items(&self, order_id: OrderId) -> Result<Vec<LineItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .line_items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn history(&self, order_id: OrderId) -> Result<Vec<HistoryRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .history
            .values()
            .filter(|record| record.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_order(&self, update: OrderUpdate) -> Result<Order> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        let order = tables
            .orders
            .get_mut(&update.order_id)
            .ok_or(StoreError::NotFound {
                entity: "Order",
                id: update.order_id.as_i64(),
            })?;
        if !tables.products.contains_key(&update.item.product_id) {
            return Err(StoreError::NotFound {
                entity: "Product",
                id: update.item.product_id.as_i64(),
            });
        }
        let item = tables
            .line_items
            .get_mut(&update.item.id)
            .filter(|item| item.order_id == update.order_id)
            .ok_or(StoreError::NotFound {
                entity: "LineItem",
                id: update.item.id.as_i64(),
            })?;

        item.product_id = update.item.product_id;
        item.quantity = update.item.quantity;
        item.unit_price = update.item.unit_price;

        order.note = update.note;
        order.total = update.total;
        if let Some(status) = update.status {
            order.status = status;
        }

        Ok(order.clone())
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let mut tables = self.tables.write().await;

        if tables.orders.remove(&id).is_none() {
            return Ok(false);
        }
        tables.notifications.retain(|_, n| n.order_id != id);
        tables.history.retain(|_, h| h.order_id != id);
        tables.line_items.retain(|_, item| item.order_id != id);

        Ok(true)
    }

    async fn append_notification(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationRecord> {
        let mut tables = self.tables.write().await;

        if !tables.orders.contains_key(&notification.order_id) {
            return Err(StoreError::NotFound {
                entity: "Order",
                id: notification.order_id.as_i64(),
            });
        }

        let row = NotificationRecord {
            id: NotificationId::new(next(&mut tables.seq.notification)),
            order_id: notification.order_id,
            kind: notification.kind,
            message: notification.message,
            sent_at: Utc::now(),
        };
        tables.notifications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn notifications(&self, order_id: OrderId) -> Result<Vec<NotificationRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .values()
            .filter(|n| n.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn orders_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<_> = tables
            .orders
            .values()
            .filter(|o| o.created_at >= since)
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.created_at, o.id));
        Ok(orders)
    }

    async fn count_orders_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|o| o.created_at >= since)
            .count() as i64)
    }

    async fn lifetime_sales(&self) -> Result<Money> {
        let tables = self.tables.read().await;
        Ok(tables.line_items.values().map(LineItem::subtotal).sum())
    }
}
