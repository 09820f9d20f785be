use {rust_decimal::Decimal, thiserror::Error};

/// Failures reported by the account store. These never leave the
/// transaction processor without being classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account not found")]
    AccountNotFound,
    #[error("insufficient funds: available {available}")]
    InsufficientFunds { available: Decimal },
    #[error("account store call timed out")]
    Timeout,
    #[error("account store unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Whether retrying later, or serving a cached read, is reasonable.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Timeout | LedgerError::Unavailable(_))
    }
}
