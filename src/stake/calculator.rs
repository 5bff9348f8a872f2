use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;

/// Compute the stake one side must put up to return `total_value` at the
/// given odds.
///
/// With `exact` false the quotient is rounded UP to the next whole currency
/// unit. The ceiling means the two sides' stakes plus rounding slack need not
/// sum back to `total_value`; the larger debit is the conservative choice.
///
/// Pure and deterministic; safe to call from any number of tasks.
pub fn compute_stake(total_value: Decimal, odds: Decimal, exact: bool) -> AppResult<Decimal> {
    if total_value <= Decimal::ZERO {
        return Err(AppError::InvalidInput(format!(
            "betting value must be positive, got {}",
            total_value
        )));
    }
    if odds <= Decimal::ZERO {
        return Err(AppError::InvalidInput(format!(
            "odds must be positive, got {}",
            odds
        )));
    }

    let stake = total_value / odds;
    Ok(if exact { stake } else { stake.ceil() })
}
