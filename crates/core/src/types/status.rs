//! Status and classification enums for the point-of-sale tables.
//!
//! Each enum maps to a `PostgreSQL` enum type of the same snake_case name
//! when the `postgres` feature is enabled.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product menu category.
///
/// The Indonesian labels used by older clients are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "product_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[serde(alias = "makanan")]
    Food,
    #[serde(alias = "minuman")]
    Drink,
}

/// Lifecycle state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "transaction_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    #[default]
    Completed,
    Failed,
}

impl TransactionStatus {
    /// Whether entries in this state count toward the cash balance.
    #[must_use]
    pub const fn affects_cash(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Business reason for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "transaction_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    Income,
    Outcome,
    /// Point-of-sale checkout.
    Selling,
    /// Stock or supply purchase.
    Buying,
}

/// Direction of money for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "transaction_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Outcome,
}

impl TransactionType {
    /// Signed change this entry applies to the cash balance.
    ///
    /// ```
    /// # use kasir_core::TransactionType;
    /// # use rust_decimal::Decimal;
    /// let amount = Decimal::from(5000);
    /// assert_eq!(TransactionType::Income.cash_delta(amount), amount);
    /// assert_eq!(TransactionType::Outcome.cash_delta(amount), -amount);
    /// ```
    #[must_use]
    pub fn cash_delta(self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Outcome => -amount,
        }
    }

    /// Category used when a client records an entry without one.
    #[must_use]
    pub const fn default_category(self) -> TransactionCategory {
        match self {
            Self::Income => TransactionCategory::Income,
            Self::Outcome => TransactionCategory::Outcome,
        }
    }
}

/// Order lifecycle state.
///
/// Checkout always writes `Completed`; the other states exist for orders
/// created by other tools against the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    #[default]
    Completed,
    Cancelled,
}

/// Staff role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Back-office access, including manual cash edits.
    Admin,
    /// Till operator: products, orders, ledger entries.
    #[default]
    Cashier,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Cashier => write!(f, "cashier"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "cashier" => Ok(Self::Cashier),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_category_accepts_legacy_labels() {
        let food: ProductCategory = serde_json::from_str("\"makanan\"").unwrap();
        let drink: ProductCategory = serde_json::from_str("\"minuman\"").unwrap();
        assert_eq!(food, ProductCategory::Food);
        assert_eq!(drink, ProductCategory::Drink);

        // Output always uses the canonical label
        assert_eq!(serde_json::to_string(&food).unwrap(), "\"food\"");
    }

    #[test]
    fn test_only_completed_entries_move_cash() {
        assert!(TransactionStatus::Completed.affects_cash());
        assert!(!TransactionStatus::Pending.affects_cash());
        assert!(!TransactionStatus::Failed.affects_cash());
    }

    #[test]
    fn test_cash_delta_sign() {
        let amount = Decimal::from(12_000);
        assert_eq!(TransactionType::Income.cash_delta(amount), Decimal::from(12_000));
        assert_eq!(TransactionType::Outcome.cash_delta(amount), Decimal::from(-12_000));
    }

    #[test]
    fn test_default_category_follows_type() {
        assert_eq!(
            TransactionType::Income.default_category(),
            TransactionCategory::Income
        );
        assert_eq!(
            TransactionType::Outcome.default_category(),
            TransactionCategory::Outcome
        );
    }

    #[test]
    fn test_user_role_round_trips_through_str() {
        for role in [UserRole::Admin, UserRole::Cashier] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("owner".parse::<UserRole>().is_err());
    }
}
