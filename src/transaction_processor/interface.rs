use {
    crate::{context::RequestContext, error::WithdrawalError},
    async_trait::async_trait,
    rust_decimal::Decimal,
};

#[async_trait]
pub trait TransactionProcessorInterface: Send + Sync {
    /// Debits `amount` from the account and returns the new balance.
    ///
    /// Every error returned is already classified; store failures never
    /// escape raw.
    async fn withdraw(
        &self,
        ctx: &mut RequestContext,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Decimal, WithdrawalError>;
}
