//! Checkout: turning a basket into an order, its ledger entry and cash.
//!
//! The whole sequence is one database transaction:
//!
//! 1. insert the order header (status `completed`)
//! 2. insert one `order_items` row per line
//! 3. insert the `selling` income entry referencing the order
//! 4. move the cash balance by the order total
//! 5. insert the "Order" notification
//!
//! Any failure rolls back all of it.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use kasir_core::{
    OrderStatus, PaymentMethodId, ProductId, TransactionCategory, TransactionStatus,
    TransactionType, UserId, line_total, order_total,
};

use super::ledger::apply_cash_delta;
use super::notifications::ORDER_CREATED;
use super::{NO_CASH_ROW, ServiceError};
use crate::db;
use crate::models::{CheckoutReceipt, NewTransaction};

/// One basket line as sent by the till.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price; the catalogue price is used when absent.
    pub price: Option<Decimal>,
}

/// Checkout payload.
///
/// Accepts either a basket or the single-product shape older tills send.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CheckoutRequest {
    Basket {
        items: Vec<CheckoutLine>,
        /// Client-computed total, checked against the lines when present.
        total: Option<Decimal>,
        payment_method_id: Option<PaymentMethodId>,
    },
    Single {
        product_id: ProductId,
        quantity: i32,
        price: Option<Decimal>,
        payment_method_id: Option<PaymentMethodId>,
    },
}

impl CheckoutRequest {
    fn into_parts(self) -> (Vec<CheckoutLine>, Option<Decimal>, Option<PaymentMethodId>) {
        match self {
            Self::Basket {
                items,
                total,
                payment_method_id,
            } => (items, total, payment_method_id),
            Self::Single {
                product_id,
                quantity,
                price,
                payment_method_id,
            } => (
                vec![CheckoutLine {
                    product_id,
                    quantity,
                    price,
                }],
                None,
                payment_method_id,
            ),
        }
    }
}

/// A line with its unit price settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Settle unit prices against the catalogue and validate quantities.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for an empty basket or a bad quantity
/// or price, and `ServiceError::NotFound` for a product not in `catalogue`.
pub fn price_lines(
    lines: &[CheckoutLine],
    catalogue: &HashMap<ProductId, Decimal>,
) -> Result<Vec<PricedLine>, ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::Validation(
            "order must contain at least one item".to_owned(),
        ));
    }

    lines
        .iter()
        .map(|line| -> Result<PricedLine, ServiceError> {
            let catalogue_price = catalogue
                .get(&line.product_id)
                .copied()
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", line.product_id))
                })?;
            let price = line.price.unwrap_or(catalogue_price);
            // Validates quantity >= 1, price >= 0 and at most two decimals.
            line_total(line.quantity, price)?;
            Ok(PricedLine {
                product_id: line.product_id,
                quantity: line.quantity,
                price,
            })
        })
        .collect()
}

/// Total of the priced lines, checked against a client-claimed total.
///
/// # Errors
///
/// Returns `ServiceError::Validation` if the total is zero, overflows or
/// differs from `claimed`.
pub fn settle_total(lines: &[PricedLine], claimed: Option<Decimal>) -> Result<Decimal, ServiceError> {
    let total = order_total(lines.iter().map(|l| (l.quantity, l.price)))?;

    if let Some(claimed) = claimed
        && claimed != total
    {
        return Err(ServiceError::Validation(format!(
            "total {claimed} does not match items total {total}"
        )));
    }
    if total <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "order total must be greater than zero".to_owned(),
        ));
    }
    Ok(total)
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order and account for it in the ledger and cash balance.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a malformed basket,
    /// `ServiceError::NotFound` for an unknown product or a missing cash row.
    /// Nothing is written in either case.
    pub async fn create_order(
        &self,
        request: CheckoutRequest,
        user: UserId,
    ) -> Result<CheckoutReceipt, ServiceError> {
        let (lines, claimed_total, payment_method_id) = request.into_parts();

        let mut tx = self.pool.begin().await?;

        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        let catalogue: HashMap<ProductId, Decimal> =
            db::products::prices(&mut *tx, &ids).await?.into_iter().collect();
        let priced = price_lines(&lines, &catalogue)?;
        let total = settle_total(&priced, claimed_total)?;

        let order = db::orders::insert(
            &mut *tx,
            priced.first().map(|l| l.product_id),
            Some(user),
            OrderStatus::Completed,
            total,
        )
        .await?;

        let mut items = Vec::with_capacity(priced.len());
        for (position, line) in (0_i32..).zip(&priced) {
            items.push(
                db::orders::insert_item(
                    &mut *tx,
                    order.id,
                    line.product_id,
                    position,
                    line.quantity,
                    line.price,
                )
                .await?,
            );
        }

        let payment = NewTransaction {
            amount: total,
            kind: TransactionType::Income,
            category: Some(TransactionCategory::Selling),
            status: Some(TransactionStatus::Completed),
            description: Some(format!("Payment for order #{}", order.id)),
            payment_method_id,
            order_id: Some(order.id),
        };
        let transaction = db::transactions::insert(&mut *tx, &payment, Some(user)).await?;

        let cash_balance = apply_cash_delta(&mut *tx, total)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NO_CASH_ROW.to_owned()))?;

        let (title, description) = ORDER_CREATED;
        db::notifications::insert(&mut *tx, title, description).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            total = %total,
            lines = items.len(),
            "Order created"
        );

        Ok(CheckoutReceipt {
            order,
            items,
            transaction,
            cash_balance,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(n: u128) -> ProductId {
        ProductId::new(uuid::Uuid::from_u128(n))
    }

    fn catalogue() -> HashMap<ProductId, Decimal> {
        HashMap::from([(product(1), dec("15000")), (product(2), dec("8000"))])
    }

    fn line(id: u128, quantity: i32, price: Option<&str>) -> CheckoutLine {
        CheckoutLine {
            product_id: product(id),
            quantity,
            price: price.map(dec),
        }
    }

    #[test]
    fn test_single_line_total_is_quantity_times_price() {
        let priced = price_lines(&[line(1, 3, Some("12500"))], &catalogue()).unwrap();
        assert_eq!(settle_total(&priced, None).unwrap(), dec("37500"));
    }

    #[test]
    fn test_missing_price_uses_catalogue() {
        let priced = price_lines(&[line(1, 2, None), line(2, 1, None)], &catalogue()).unwrap();
        assert_eq!(priced[0].price, dec("15000"));
        assert_eq!(settle_total(&priced, None).unwrap(), dec("38000"));
    }

    #[test]
    fn test_claimed_total_must_match() {
        let priced = price_lines(&[line(1, 2, None)], &catalogue()).unwrap();
        assert!(settle_total(&priced, Some(dec("30000.00"))).is_ok());
        assert!(matches!(
            settle_total(&priced, Some(dec("29000"))),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_sub_cent_price_is_rejected() {
        assert!(matches!(
            price_lines(&[line(1, 3, Some("0.333"))], &catalogue()),
            Err(ServiceError::Validation(_))
        ));
        let priced = price_lines(&[line(1, 3, Some("0.33"))], &catalogue()).unwrap();
        assert_eq!(settle_total(&priced, None).unwrap(), dec("0.99"));
    }

    #[test]
    fn test_rejects_empty_basket_and_bad_quantity() {
        assert!(matches!(
            price_lines(&[], &catalogue()),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            price_lines(&[line(1, 0, None)], &catalogue()),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            price_lines(&[line(1, 1, Some("-1"))], &catalogue()),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_product_is_not_found() {
        assert!(matches!(
            price_lines(&[line(9, 1, Some("1000"))], &catalogue()),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_zero_total_rejected() {
        let priced = price_lines(&[line(1, 1, Some("0"))], &catalogue()).unwrap();
        assert!(settle_total(&priced, None).is_err());
    }

    #[test]
    fn test_request_shapes() {
        let basket: CheckoutRequest = serde_json::from_str(
            r#"{"items": [{"product_id": "00000000-0000-0000-0000-000000000001", "quantity": 2}], "total": 30000}"#,
        )
        .unwrap();
        let (lines, total, _) = basket.into_parts();
        assert_eq!(lines, vec![line(1, 2, None)]);
        assert_eq!(total, Some(dec("30000")));

        let single: CheckoutRequest = serde_json::from_str(
            r#"{"product_id": "00000000-0000-0000-0000-000000000002", "quantity": 1, "price": 8000}"#,
        )
        .unwrap();
        let (lines, total, _) = single.into_parts();
        assert_eq!(lines, vec![line(2, 1, Some("8000"))]);
        assert!(total.is_none());
    }
}
