//! Order repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use kasir_core::{OrderId, OrderStatus, ProductId, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{Order, OrderDetail, OrderItem};

const ORDER_COLUMNS: &str = "id, product_id, user_uid, status, total_amount, created_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, position, quantity, price";

/// Read access to orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// An order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(order) = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY position"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail { order, items }))
    }
}

/// Insert the order header.
///
/// # Errors
///
/// Returns `RepositoryError::InvalidReference` if the product does not exist.
pub async fn insert(
    conn: &mut PgConnection,
    product_id: Option<ProductId>,
    user: Option<UserId>,
    status: OrderStatus,
    total_amount: Decimal,
) -> Result<Order, RepositoryError> {
    sqlx::query_as::<_, Order>(&format!(
        r"
        INSERT INTO orders (product_id, user_uid, status, total_amount)
        VALUES ($1, $2, $3, $4)
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(product_id)
    .bind(user)
    .bind(status)
    .bind(total_amount)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "order already exists"))
}

/// Insert one order line at `position` (0-based basket order).
///
/// # Errors
///
/// Returns `RepositoryError::InvalidReference` if the product does not exist.
pub async fn insert_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    product_id: ProductId,
    position: i32,
    quantity: i32,
    price: Decimal,
) -> Result<OrderItem, RepositoryError> {
    sqlx::query_as::<_, OrderItem>(&format!(
        r"
        INSERT INTO order_items (order_id, product_id, position, quantity, price)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {ITEM_COLUMNS}
        "
    ))
    .bind(order_id)
    .bind(product_id)
    .bind(position)
    .bind(quantity)
    .bind(price)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "order item already exists"))
}
