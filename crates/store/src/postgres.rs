use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::model::{
    Customer, HistoryRecord, LineItem, NewCustomer, NewNotification, NewOrder, NewProduct,
    NotificationRecord, Order, OrderUpdate, PlacedOrder, Product,
};
use crate::store::Store;
use crate::{
    CustomerId, HistoryId, LineItemId, Money, NotificationId, OrderId, ProductId, Result,
    StoreError,
};

const ORDER_COLUMNS: &str = "id, customer_id, status, created_at, note, total_cents";
const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price_cents";
const HISTORY_COLUMNS: &str = "id, order_id, previous_status, new_status, changed_at";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    fn row_to_customer(row: PgRow) -> Result<Customer> {
        Ok(Customer {
            id: CustomerId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            delivery_address: row.try_get("delivery_address")?,
            password_hash: row.try_get("password_hash")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            note: row.try_get("note")?,
            total: Money::from_cents(row.try_get("total_cents")?),
        })
    }

    fn row_to_item(row: PgRow) -> Result<LineItem> {
        let quantity: i64 = row.try_get("quantity")?;
        Ok(LineItem {
            id: LineItemId::new(row.try_get("id")?),
            order_id: OrderId::new(row.try_get("order_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: u32::try_from(quantity).map_err(|_| StoreError::InvalidValue {
                column: "order_items.quantity",
                value: quantity,
            })?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        })
    }

    fn row_to_history(row: PgRow) -> Result<HistoryRecord> {
        Ok(HistoryRecord {
            id: HistoryId::new(row.try_get("id")?),
            order_id: OrderId::new(row.try_get("order_id")?),
            previous_status: row.try_get("previous_status")?,
            new_status: row.try_get("new_status")?,
            changed_at: row.try_get("changed_at")?,
        })
    }

    fn row_to_notification(row: PgRow) -> Result<NotificationRecord> {
        Ok(NotificationRecord {
            id: NotificationId::new(row.try_get("id")?),
            order_id: OrderId::new(row.try_get("order_id")?),
            kind: row.try_get("kind")?,
            message: row.try_get("message")?,
            sent_at: row.try_get("sent_at")?,
        })
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let row = sqlx::query(
            r#"
            INSERT INTO customers (name, email, phone, delivery_address, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, phone, delivery_address, password_hash
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.delivery_address)
        .bind(&customer.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("customers_email_unique")
            {
                return StoreError::DuplicateEmail(customer.email.clone());
            }
            StoreError::Database(e)
        })?;

        Self::row_to_customer(row)
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, delivery_address, password_hash
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, delivery_address, password_hash
            FROM customers
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn count_customers(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(products.len());

        for product in products {
            let row = sqlx::query(
                r#"
                INSERT INTO products (name, description, price_cents)
                VALUES ($1, $2, $3)
                RETURNING id, name, description, price_cents
                "#,
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.cents())
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(Self::row_to_product(row)?);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, name, description, price_cents FROM products WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows =
            sqlx::query("SELECT id, name, description, price_cents FROM products ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn count_products(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn set_product_price(&self, id: ProductId, price: Money) -> Result<()> {
        let result = sqlx::query("UPDATE products SET price_cents = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(price.cents())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Product",
                id: id.as_i64(),
            });
        }
        Ok(())
    }

    async fn create_order(&self, new: NewOrder) -> Result<PlacedOrder> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (customer_id, status, created_at, note, total_cents)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new.customer_id.as_i64())
        .bind(&new.status)
        .bind(new.created_at)
        .bind(&new.note)
        .bind(new.total.cents())
        .fetch_one(&mut *tx)
        .await?;
        let order = Self::row_to_order(row)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(order.id.as_i64())
        .bind(new.item.product_id.as_i64())
        .bind(i64::from(new.item.quantity))
        .bind(new.item.unit_price.cents())
        .fetch_one(&mut *tx)
        .await?;
        let item = Self::row_to_item(row)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO order_history (order_id, previous_status, new_status, changed_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {HISTORY_COLUMNS}
            "#
        ))
        .bind(order.id.as_i64())
        .bind(&new.history.previous_status)
        .bind(&new.history.new_status)
        .bind(new.created_at)
        .fetch_one(&mut *tx)
        .await?;
        let history = Self::row_to_history(row)?;

        tx.commit().await?;

        Ok(PlacedOrder {
            order,
            item,
            history,
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn line_items(&self, order_id: OrderId) -> Result<Vec<LineItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id ASC"
        ))
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn history(&self, order_id: OrderId) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {HISTORY_COLUMNS} FROM order_history WHERE order_id = $1 ORDER BY id ASC"
        ))
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_history).collect()
    }

    async fn update_order(&self, update: OrderUpdate) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET note = $2, total_cents = $3, status = COALESCE($4, status)
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(update.order_id.as_i64())
        .bind(&update.note)
        .bind(update.total.cents())
        .bind(&update.status)
        .fetch_optional(&mut *tx)
        .await?;

        // Dropping the transaction without commit rolls it back.
        let Some(row) = row else {
            tracing::debug!(order_id = %update.order_id, "update of missing order rolled back");
            return Err(StoreError::NotFound {
                entity: "Order",
                id: update.order_id.as_i64(),
            });
        };
        let order = Self::row_to_order(row)?;

        let result = sqlx::query(
            r#"
            UPDATE order_items
            SET product_id = $3, quantity = $4, unit_price_cents = $5
            WHERE id = $1 AND order_id = $2
            "#,
        )
        .bind(update.item.id.as_i64())
        .bind(update.order_id.as_i64())
        .bind(update.item.product_id.as_i64())
        .bind(i64::from(update.item.quantity))
        .bind(update.item.unit_price.cents())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                tracing::debug!(
                    product_id = %update.item.product_id,
                    "update references missing product"
                );
                return StoreError::NotFound {
                    entity: "Product",
                    id: update.item.product_id.as_i64(),
                };
            }
            StoreError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "LineItem",
                id: update.item.id.as_i64(),
            });
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        for table in ["notifications", "order_history", "order_items"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE order_id = $1"))
                .bind(id.as_i64())
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::debug!(order_id = %id, "delete of missing order rolled back");
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn append_notification(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO notifications (order_id, kind, message)
            VALUES ($1, $2, $3)
            RETURNING id, order_id, kind, message, sent_at
            "#,
        )
        .bind(notification.order_id.as_i64())
        .bind(&notification.kind)
        .bind(&notification.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return StoreError::NotFound {
                    entity: "Order",
                    id: notification.order_id.as_i64(),
                };
            }
            StoreError::Database(e)
        })?;

        Self::row_to_notification(row)
    }

    async fn notifications(&self, order_id: OrderId) -> Result<Vec<NotificationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, kind, message, sent_at
            FROM notifications
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_notification).collect()
    }

    async fn orders_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE created_at >= $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn count_orders_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn lifetime_sales(&self) -> Result<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity * unit_price_cents), 0)::BIGINT FROM order_items",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(Money::from_cents(cents))
    }
}
