//! Dashboard aggregation over current rows.
//!
//! Every figure is recomputed per request; nothing is cached.

use chrono::{DateTime, Duration, Utc};
use common::Money;
use serde::Serialize;
use store::{LineItem, Order, Store};

use crate::error::DomainError;

/// Default look-back window for "recent" orders, in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// A recent order with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentOrder {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<LineItem>,
}

/// Figures shown on the dashboard.
///
/// `recent_orders` and `orders` cover the configured window, while
/// `total_sales` sums every line item ever stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub recent_orders: i64,
    pub customers: i64,
    pub products: i64,
    pub total_sales: Money,
    pub orders: Vec<RecentOrder>,
}

/// Service computing the dashboard summary.
pub struct DashboardService<S: Store> {
    store: S,
    window: Duration,
}

impl<S: Store> DashboardService<S> {
    pub fn new(store: S, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Computes the summary as of now.
    ///
    /// Any store failure degrades the whole summary to zeros and an empty
    /// order list; the error is logged, not returned.
    pub async fn summary(&self) -> DashboardSummary {
        self.summary_at(Utc::now()).await
    }

    /// Computes the summary as of `now`, degrading to defaults on failure.
    pub async fn summary_at(&self, now: DateTime<Utc>) -> DashboardSummary {
        match self.try_summary_at(now).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load dashboard data");
                DashboardSummary::default()
            }
        }
    }

    /// Computes the summary as of `now`, surfacing store errors.
    #[tracing::instrument(skip(self))]
    pub async fn try_summary_at(&self, now: DateTime<Utc>) -> Result<DashboardSummary, DomainError> {
        let since = now
            .checked_sub_signed(self.window)
            .ok_or_else(|| DomainError::validation("Dashboard window is out of range"))?;

        let recent_orders = self.store.count_orders_since(since).await?;
        let customers = self.store.count_customers().await?;
        let products = self.store.count_products().await?;
        let total_sales = self.store.lifetime_sales().await?;

        let mut orders = Vec::new();
        for order in self.store.orders_since(since).await? {
            let items = self.store.line_items(order.id).await?;
            orders.push(RecentOrder { order, items });
        }

        Ok(DashboardSummary {
            recent_orders,
            customers,
            products,
            total_sales,
            orders,
        })
    }
}
