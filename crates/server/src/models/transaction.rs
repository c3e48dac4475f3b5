//! Ledger entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasir_core::{
    OrderId, PaymentMethodId, TransactionCategory, TransactionId, TransactionStatus,
    TransactionType, UserId,
};

/// A money movement in or out of the till.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Decimal,
    pub user_uid: Option<UserId>,
    pub status: TransactionStatus,
    pub category: TransactionCategory,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: TransactionType,
    pub description: Option<String>,
    pub order_id: Option<OrderId>,
    pub payment_method_id: Option<PaymentMethodId>,
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a ledger entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Option<TransactionCategory>,
    pub status: Option<TransactionStatus>,
    pub description: Option<String>,
    pub payment_method_id: Option<PaymentMethodId>,
    #[serde(skip)]
    pub order_id: Option<OrderId>,
}

/// Partial update of a ledger entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionChanges {
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category: Option<TransactionCategory>,
    pub status: Option<TransactionStatus>,
    pub description: Option<String>,
    pub payment_method_id: Option<PaymentMethodId>,
}
