//! Order service providing the order lifecycle operations.

use chrono::Utc;
use common::{CustomerId, Money, OrderId};
use serde::Serialize;
use store::{
    HistoryRecord, LineItem, LineItemUpdate, NewHistoryRecord, NewLineItem, NewOrder, Order,
    OrderUpdate, Product, Store, StoreExt,
};

use super::{CreateOrder, EditOrder, STATUS_CREATED, STATUS_IN_PROGRESS};
use crate::error::DomainError;

/// An order with its line items and status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<LineItem>,
    pub history: Vec<HistoryRecord>,
}

impl OrderDetails {
    /// Returns the line item the edit form operates on.
    pub fn first_item(&self) -> Option<&LineItem> {
        self.items.first()
    }
}

/// What the order edit form needs to render.
#[derive(Debug, Clone, Serialize)]
pub struct EditView {
    pub order: OrderDetails,
    /// Catalog entry of the first line item's product.
    pub current_product: Option<Product>,
    pub products: Vec<Product>,
    /// Whether the viewer may set the order status.
    pub can_edit_status: bool,
}

/// Service for managing orders.
///
/// One customer id, the privileged identity, may overwrite order status
/// during an edit. Everyone else edits items and notes only.
pub struct OrderService<S: Store> {
    store: S,
    admin: CustomerId,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service with the given store and privileged
    /// identity.
    pub fn new(store: S, admin: CustomerId) -> Self {
        Self { store, admin }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns true if `actor` may set order status directly.
    pub fn is_privileged(&self, actor: CustomerId) -> bool {
        actor == self.admin
    }

    /// Places an order.
    ///
    /// The order, its single line item (with a snapshot of the product
    /// price) and a "Created" -> "In progress" history record are written
    /// in one transaction. Nothing is written if the product is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<OrderDetails, DomainError> {
        let customer_id = cmd.customer_id.ok_or(DomainError::AuthRequired)?;
        validate_quantity(cmd.quantity)?;

        let product = self.store.require_product(cmd.product_id).await?;
        let total = product.price.multiply(cmd.quantity);

        let placed = self
            .store
            .create_order(NewOrder {
                customer_id,
                status: STATUS_IN_PROGRESS.to_string(),
                created_at: Utc::now(),
                note: cmd.note,
                total,
                item: NewLineItem {
                    product_id: product.id,
                    quantity: cmd.quantity,
                    unit_price: product.price,
                },
                history: NewHistoryRecord {
                    previous_status: STATUS_CREATED.to_string(),
                    new_status: STATUS_IN_PROGRESS.to_string(),
                },
            })
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %placed.order.id, %customer_id, total = %total, "order created");

        Ok(OrderDetails {
            order: placed.order,
            items: vec![placed.item],
            history: vec![placed.history],
        })
    }

    /// Loads an order with its items and history.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderDetails, DomainError> {
        let order = self.store.require_order(order_id).await?;
        let items = self.store.line_items(order_id).await?;
        let history = self.store.history(order_id).await?;

        Ok(OrderDetails {
            order,
            items,
            history,
        })
    }

    /// Loads everything the edit form shows for `order_id`.
    #[tracing::instrument(skip(self))]
    pub async fn edit_view(
        &self,
        order_id: OrderId,
        actor: CustomerId,
    ) -> Result<EditView, DomainError> {
        let order = self.get_order(order_id).await?;
        let first = order.first_item().ok_or(DomainError::NotFound {
            entity: "LineItem",
            id: order_id.as_i64(),
        })?;
        let current_product = self.store.get_product(first.product_id).await?;
        let products = self.store.list_products().await?;

        Ok(EditView {
            order,
            current_product,
            products,
            can_edit_status: self.is_privileged(actor),
        })
    }

    /// Edits an order in place.
    ///
    /// Only the first line item is rewritten; its price snapshot is taken
    /// from the newly chosen product. The order total is then recomputed
    /// over every line item of the order. A status supplied by the
    /// privileged identity overwrites the current one verbatim; no history
    /// record is appended for it.
    #[tracing::instrument(skip(self))]
    pub async fn edit_order(&self, cmd: EditOrder) -> Result<OrderDetails, DomainError> {
        let order = self.store.require_order(cmd.order_id).await?;
        let mut items = self.store.line_items(order.id).await?;
        let first = items.first_mut().ok_or(DomainError::NotFound {
            entity: "LineItem",
            id: order.id.as_i64(),
        })?;
        validate_quantity(cmd.quantity)?;

        let product = self.store.require_product(cmd.product_id).await?;
        first.product_id = product.id;
        first.quantity = cmd.quantity;
        first.unit_price = product.price;
        let item = LineItemUpdate {
            id: first.id,
            product_id: first.product_id,
            quantity: first.quantity,
            unit_price: first.unit_price,
        };

        let total: Money = items.iter().map(LineItem::subtotal).sum();

        let status = if self.is_privileged(cmd.actor) {
            cmd.status.filter(|s| !s.trim().is_empty())
        } else {
            if cmd.status.is_some() {
                tracing::debug!(actor = %cmd.actor, "ignoring status from non-privileged actor");
            }
            None
        };

        let order = self
            .store
            .update_order(OrderUpdate {
                order_id: order.id,
                item,
                note: cmd.note,
                total,
                status,
            })
            .await?;
        let history = self.store.history(order.id).await?;

        metrics::counter!("orders_updated_total").increment(1);
        tracing::info!(order_id = %order.id, total = %order.total, status = %order.status, "order updated");

        Ok(OrderDetails {
            order,
            items,
            history,
        })
    }

    /// Deletes an order with its line items, history and notifications.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), DomainError> {
        if !self.store.delete_order(order_id).await? {
            return Err(DomainError::NotFound {
                entity: "Order",
                id: order_id.as_i64(),
            });
        }

        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!(%order_id, "order deleted");
        Ok(())
    }
}

fn validate_quantity(quantity: u32) -> Result<(), DomainError> {
    if quantity == 0 {
        return Err(DomainError::validation("Quantity must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use store::{InMemoryStore, NewCustomer, NewProduct, ProductId};

    use super::*;

    async fn setup() -> (OrderService<InMemoryStore>, CustomerId, ProductId) {
        let store = InMemoryStore::new();
        let customer = store
            .insert_customer(NewCustomer {
                name: "Admin".to_string(),
                email: "admin@x.com".to_string(),
                phone: None,
                delivery_address: None,
                password_hash: "h".to_string(),
            })
            .await
            .unwrap();
        let product = store
            .insert_products(vec![NewProduct::new("Lamp", "LED", Money::from_cents(1990))])
            .await
            .unwrap()
            .remove(0);
        (
            OrderService::new(store, CustomerId::new(1)),
            customer.id,
            product.id,
        )
    }

    #[tokio::test]
    async fn create_without_customer_requires_auth() {
        let (service, _, product_id) = setup().await;
        let cmd = CreateOrder {
            customer_id: None,
            product_id,
            quantity: 1,
            note: String::new(),
        };

        let err = service.create_order(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::AuthRequired));
    }

    #[tokio::test]
    async fn create_rejects_zero_quantity() {
        let (service, customer, product_id) = setup().await;

        let err = service
            .create_order(CreateOrder::new(customer, product_id, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(service.store().line_item_count().await, 0);
    }

    #[tokio::test]
    async fn edit_view_reports_privilege() {
        let (service, customer, product_id) = setup().await;
        let details = service
            .create_order(CreateOrder::new(customer, product_id, 1))
            .await
            .unwrap();

        let admin_view = service
            .edit_view(details.order.id, CustomerId::new(1))
            .await
            .unwrap();
        assert!(admin_view.can_edit_status);
        assert_eq!(admin_view.current_product.unwrap().id, product_id);
        assert_eq!(admin_view.products.len(), 1);

        let other_view = service
            .edit_view(details.order.id, CustomerId::new(2))
            .await
            .unwrap();
        assert!(!other_view.can_edit_status);
    }

    #[tokio::test]
    async fn blank_admin_status_leaves_status_unchanged() {
        let (service, customer, product_id) = setup().await;
        let details = service
            .create_order(CreateOrder::new(customer, product_id, 1))
            .await
            .unwrap();

        let edited = service
            .edit_order(
                EditOrder::new(details.order.id, CustomerId::new(1), product_id, 2)
                    .with_status("   "),
            )
            .await
            .unwrap();

        assert_eq!(edited.order.status, STATUS_IN_PROGRESS);
    }
}
