//! Cash balance commands.

use rust_decimal::Decimal;

use kasir_core::check_scale;
use kasir_server::db::CashRepository;

use super::{CommandError, connect};

/// Create the single cash row with an opening balance.
///
/// Leaves an existing row untouched.
pub async fn init(nominal: Decimal) -> Result<(), CommandError> {
    if nominal < Decimal::ZERO {
        return Err(CommandError::Invalid("nominal cannot be negative".to_string()));
    }
    check_scale(nominal).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let pool = connect().await?;
    let cash = CashRepository::new(&pool).init(nominal).await?;

    tracing::info!(cash_id = %cash.id, nominal = %cash.nominal, "Cash row ready");
    Ok(())
}
