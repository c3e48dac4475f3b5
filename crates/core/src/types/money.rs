//! Decimal money arithmetic for order totals.
//!
//! Amounts are plain [`Decimal`] values in the store's currency unit. The
//! helpers here compute line and order totals with checked arithmetic so an
//! absurd quantity cannot silently wrap.

use rust_decimal::Decimal;
use thiserror::Error;

/// Decimal places every stored amount carries (`NUMERIC(14,2)`).
pub const MONEY_SCALE: u32 = 2;

/// Errors from money arithmetic and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(i32),

    /// Prices and amounts cannot be negative.
    #[error("amount cannot be negative (got {0})")]
    NegativeAmount(Decimal),

    /// More decimal places than the store keeps.
    #[error("amount {0} has more than 2 decimal places")]
    TooPrecise(Decimal),

    /// The computed value does not fit in a `Decimal`.
    #[error("amount overflow")]
    Overflow,
}

/// Reject amounts the database would round on insert.
///
/// Trailing zeros do not count, so `1.500` is accepted.
///
/// # Errors
///
/// Returns `MoneyError::TooPrecise` past [`MONEY_SCALE`] decimal places.
pub fn check_scale(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(MoneyError::TooPrecise(amount));
    }
    Ok(amount)
}

/// Compute `quantity × unit_price` for one order line.
///
/// # Errors
///
/// Returns `MoneyError::InvalidQuantity` if `quantity < 1`,
/// `MoneyError::NegativeAmount` if the price is negative,
/// `MoneyError::TooPrecise` if it has sub-cent digits, and
/// `MoneyError::Overflow` if the product does not fit.
pub fn line_total(quantity: i32, unit_price: Decimal) -> Result<Decimal, MoneyError> {
    if quantity < 1 {
        return Err(MoneyError::InvalidQuantity(quantity));
    }
    if unit_price < Decimal::ZERO {
        return Err(MoneyError::NegativeAmount(unit_price));
    }
    check_scale(unit_price)?;

    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or(MoneyError::Overflow)
}

/// Sum the line totals of `(quantity, unit_price)` pairs.
///
/// An empty iterator totals zero; callers reject empty orders themselves.
///
/// # Errors
///
/// Propagates the first error from [`line_total`], or `MoneyError::Overflow`
/// if the running sum overflows.
pub fn order_total<I>(lines: I) -> Result<Decimal, MoneyError>
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, (quantity, price)| {
            let line = line_total(quantity, price)?;
            acc.checked_add(line).ok_or(MoneyError::Overflow)
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_total_is_quantity_times_price() {
        assert_eq!(line_total(3, dec("12500")).unwrap(), dec("37500"));
        assert_eq!(line_total(1, dec("0.50")).unwrap(), dec("0.50"));
    }

    #[test]
    fn test_line_total_rejects_zero_quantity() {
        assert_eq!(line_total(0, dec("10")), Err(MoneyError::InvalidQuantity(0)));
        assert_eq!(line_total(-2, dec("10")), Err(MoneyError::InvalidQuantity(-2)));
    }

    #[test]
    fn test_line_total_rejects_negative_price() {
        assert!(matches!(
            line_total(1, dec("-1")),
            Err(MoneyError::NegativeAmount(_))
        ));
    }

    #[test]
    fn test_sub_cent_price_is_rejected() {
        assert_eq!(
            line_total(3, dec("0.333")),
            Err(MoneyError::TooPrecise(dec("0.333")))
        );
        assert_eq!(line_total(3, dec("0.330")).unwrap(), dec("0.99"));
    }

    #[test]
    fn test_check_scale() {
        assert!(check_scale(dec("12500")).is_ok());
        assert!(check_scale(dec("0.05")).is_ok());
        assert!(check_scale(dec("7.5000")).is_ok());
        assert!(matches!(check_scale(dec("0.001")), Err(MoneyError::TooPrecise(_))));
        assert!(matches!(check_scale(dec("-3.141")), Err(MoneyError::TooPrecise(_))));
    }

    #[test]
    fn test_free_item_is_allowed() {
        assert_eq!(line_total(4, Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_order_total_sums_lines() {
        let total = order_total([(2, dec("15000")), (1, dec("8000")), (3, dec("2500"))]).unwrap();
        assert_eq!(total, dec("45500"));
    }

    #[test]
    fn test_order_total_stops_at_first_bad_line() {
        let result = order_total([(2, dec("15000")), (0, dec("8000"))]);
        assert_eq!(result, Err(MoneyError::InvalidQuantity(0)));
    }

    #[test]
    fn test_order_total_overflow() {
        let result = order_total([(i32::MAX, Decimal::MAX)]);
        assert_eq!(result, Err(MoneyError::Overflow));
    }
}
