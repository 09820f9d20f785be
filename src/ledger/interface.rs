use {crate::ledger::error::LedgerError, async_trait::async_trait, rust_decimal::Decimal};

/// Account store capability consumed by the transaction processor.
///
/// Implementations own their concurrency discipline: conflicting updates to
/// one account must be serialized by the store, and `debit` must check and
/// apply the new balance atomically.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
    /// Returns the current balance of an account.
    async fn get_balance(&self, account_id: &str) -> Result<Decimal, LedgerError>;

    /// Debits `amount` if the balance covers it and returns the new balance.
    async fn debit(&self, account_id: &str, amount: Decimal) -> Result<Decimal, LedgerError>;
}
