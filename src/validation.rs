//! Boundary checks run before any business logic.

use {
    crate::{error::WithdrawalError, models::WithdrawalRequest},
    rust_decimal::Decimal,
};

pub fn require_non_blank(field: &str, value: &str) -> Result<(), WithdrawalError> {
    if value.trim().is_empty() {
        return Err(WithdrawalError::validation(field, "must not be blank"));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: Decimal) -> Result<(), WithdrawalError> {
    if value <= Decimal::ZERO {
        return Err(WithdrawalError::validation(field, "must be greater than zero"));
    }
    Ok(())
}

/// Checks a withdrawal request, stopping at the first violation.
pub fn validate_withdrawal(request: &WithdrawalRequest) -> Result<(), WithdrawalError> {
    require_non_blank("accountId", &request.account_id)?;
    require_positive("amount", request.amount)?;
    Ok(())
}
