//! Product catalog listing and startup seeding.

use common::Money;
use store::{NewProduct, Product, Store};

use crate::error::DomainError;

/// The fixed storefront catalog inserted on first start.
pub fn default_catalog() -> Vec<NewProduct> {
    vec![
        NewProduct::new(
            "Polo Shirt",
            "Cotton polo shirt, comfortable and well made. Good for casual occasions.",
            Money::from_cents(4990),
        ),
        NewProduct::new(
            "Running Shoes",
            "High-performance sports shoes for running and workouts.",
            Money::from_cents(15999),
        ),
        NewProduct::new(
            "Smartphone XYZ 12",
            "6.5-inch smartphone with 128GB of storage and a 48MP camera.",
            Money::from_cents(199990),
        ),
        NewProduct::new(
            "Dell Inspiron Laptop",
            "Dell Inspiron laptop with an Intel i7 processor, 16GB RAM and a 512GB SSD.",
            Money::from_cents(349990),
        ),
        NewProduct::new(
            "A4 Notebook",
            "Spiral A4 notebook with 200 sheets for school or office notes.",
            Money::from_cents(990),
        ),
        NewProduct::new(
            "Electric Coffee Maker",
            "1000W coffee maker with a permanent filter for quick brewing.",
            Money::from_cents(12990),
        ),
        NewProduct::new(
            "Bluetooth Headphones",
            "Noise-cancelling Bluetooth headphones with up to 20 hours of battery.",
            Money::from_cents(29990),
        ),
        NewProduct::new(
            "24\" Full HD Monitor",
            "24-inch Full HD monitor for work and gaming.",
            Money::from_cents(89990),
        ),
        NewProduct::new(
            "Wristwatch",
            "Analog wristwatch with a leather strap.",
            Money::from_cents(8990),
        ),
        NewProduct::new(
            "LED Bulb",
            "10W LED bulb, energy efficient, rated for up to 20,000 hours.",
            Money::from_cents(1990),
        ),
    ]
}

/// Service for the product catalog.
pub struct CatalogService<S: Store> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns every product ordered by id.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.list_products().await?)
    }

    /// Inserts [`default_catalog`] if the catalog is empty.
    ///
    /// Returns the number of products inserted, which is zero on every
    /// start after the first.
    #[tracing::instrument(skip(self))]
    pub async fn seed(&self) -> Result<usize, DomainError> {
        if self.store.count_products().await? > 0 {
            tracing::debug!("catalog already seeded");
            return Ok(0);
        }

        let inserted = self.store.insert_products(default_catalog()).await?;
        tracing::info!(count = inserted.len(), "catalog seeded");
        Ok(inserted.len())
    }
}

#[cfg(test)]
mod tests {
    use store::InMemoryStore;

    use super::*;

    #[test]
    fn default_catalog_has_ten_priced_products() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.iter().all(|p| p.price.cents() > 0));
        assert_eq!(catalog[0].price, Money::from_cents(4990));
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let store = InMemoryStore::new();
        let catalog = CatalogService::new(store.clone());

        assert_eq!(catalog.seed().await.unwrap(), 10);
        assert_eq!(catalog.seed().await.unwrap(), 0);
        assert_eq!(store.count_products().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn list_products_is_ordered_by_id() {
        let store = InMemoryStore::new();
        let catalog = CatalogService::new(store);
        catalog.seed().await.unwrap();

        let products = catalog.list_products().await.unwrap();
        let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(products[0].name, "Polo Shirt");
    }
}
