//! Orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use kasir_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::Transaction;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    /// First line's product.
    pub product_id: Option<ProductId>,
    pub user_uid: Option<UserId>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    /// 0-based place of the line in the basket.
    pub position: i32,
    pub quantity: i32,
    /// Unit price at the time of sale.
    pub price: Decimal,
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Everything a checkout wrote, returned to the till.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub transaction: Transaction,
    /// Cash on hand after the sale.
    pub cash_balance: Decimal,
}
