use serde::{Deserialize, Serialize};

/// Declares a typed wrapper around a database row id.
///
/// Each id wraps the `BIGSERIAL` key of its table so that an order id can
/// never be passed where a product id is expected.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw row id.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw row id.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

row_id!(
    /// Identifier of a registered customer.
    CustomerId
);

row_id!(
    /// Identifier of a catalog product.
    ProductId
);

row_id!(
    /// Identifier of an order.
    OrderId
);

row_id!(
    /// Identifier of a line item within an order.
    LineItemId
);

row_id!(
    /// Identifier of an order status-history record.
    HistoryId
);

row_id!(
    /// Identifier of a notification recorded for an order.
    NotificationId
);
