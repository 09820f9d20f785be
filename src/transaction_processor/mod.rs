//! Transaction Processor module applying the withdrawal rule against the account store.
//! Store failures are recovered from, wrapped with context, or re-classified here, so
//! nothing above this module ever sees a raw `LedgerError`.

pub mod cache;
pub mod interface;

use {
    crate::{
        config::StoreConfig,
        context::RequestContext,
        error::WithdrawalError,
        ledger::{error::LedgerError, interface::LedgerInterface},
        metrics::{BALANCE_CACHE_FALLBACKS_TOTAL, WITHDRAWAL_PROCESSING_TIME_SECONDS},
        transaction_processor::{cache::BalanceCache, interface::TransactionProcessorInterface},
    },
    async_trait::async_trait,
    chrono::TimeDelta,
    config::ConfigError,
    rust_decimal::Decimal,
    std::{future::Future, sync::Arc, time::Duration},
};

/// Where the balance checked before debiting came from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ObservedBalance {
    Live(Decimal),
    Cached,
}

pub struct TransactionProcessor {
    ledger: Arc<dyn LedgerInterface>,
    cache: BalanceCache,
    store_timeout: Duration,
}

impl TransactionProcessor {
    pub fn new(
        ledger: Arc<dyn LedgerInterface>,
        store_timeout: Duration,
        cache_max_age: TimeDelta,
    ) -> Self {
        TransactionProcessor {
            ledger,
            cache: BalanceCache::new(cache_max_age),
            store_timeout,
        }
    }

    pub fn from_config(
        ledger: Arc<dyn LedgerInterface>,
        config: &StoreConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(ledger, config.timeout(), config.cache_max_age()?))
    }

    pub fn cache(&self) -> &BalanceCache {
        &self.cache
    }

    async fn process_withdrawal(
        &self,
        ctx: &mut RequestContext,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Decimal, WithdrawalError> {
        let observed = self.current_balance(ctx, account_id).await?;

        // A cached figure may be stale in either direction; the store's debit re-checks it.
        if let ObservedBalance::Live(balance) = observed
            && amount > balance
        {
            return Err(WithdrawalError::insufficient_funds(
                account_id, amount, balance,
            ));
        }

        self.debit(ctx, account_id, amount).await
    }

    async fn within_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .unwrap_or(Err(LedgerError::Timeout))
    }

    async fn current_balance(
        &self,
        ctx: &mut RequestContext,
        account_id: &str,
    ) -> Result<ObservedBalance, WithdrawalError> {
        match self.within_timeout(self.ledger.get_balance(account_id)).await {
            Ok(balance) => {
                self.cache.store(account_id, balance);
                Ok(ObservedBalance::Live(balance))
            }
            Err(LedgerError::AccountNotFound) => {
                self.cache.invalidate(account_id);
                Err(WithdrawalError::account_not_found(account_id))
            }
            Err(e) if e.is_transient() => match self.cache.fresh(account_id) {
                Some(balance) => {
                    ctx.note(format!(
                        "balance lookup failed ({e}), continuing with cached balance {balance}"
                    ));
                    BALANCE_CACHE_FALLBACKS_TOTAL.inc();
                    Ok(ObservedBalance::Cached)
                }
                None => {
                    ctx.note(format!("balance lookup failed ({e}), no cached balance"));
                    Err(WithdrawalError::unexpected(e))
                }
            },
            Err(e) => {
                ctx.note(format!("balance lookup failed ({e})"));
                Err(WithdrawalError::unexpected(e))
            }
        }
    }

    async fn debit(
        &self,
        ctx: &mut RequestContext,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Decimal, WithdrawalError> {
        match self.within_timeout(self.ledger.debit(account_id, amount)).await {
            Ok(new_balance) => {
                self.cache.store(account_id, new_balance);
                Ok(new_balance)
            }
            Err(LedgerError::InsufficientFunds { available }) => {
                // Another debit landed between the lookup and ours.
                ctx.note(format!("store rejected debit, available {available}"));
                self.cache.store(account_id, available);
                Err(WithdrawalError::insufficient_funds(
                    account_id, amount, available,
                ))
            }
            Err(LedgerError::AccountNotFound) => {
                self.cache.invalidate(account_id);
                Err(WithdrawalError::account_not_found(account_id))
            }
            Err(e) => {
                // Whether the debit was applied is unknown.
                self.cache.invalidate(account_id);
                ctx.note(format!("debit failed ({e})"));
                Err(WithdrawalError::wrap(
                    format!("failed to debit account {account_id}"),
                    e,
                ))
            }
        }
    }
}

#[async_trait]
impl TransactionProcessorInterface for TransactionProcessor {
    async fn withdraw(
        &self,
        ctx: &mut RequestContext,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Decimal, WithdrawalError> {
        crate::timed!(
            WITHDRAWAL_PROCESSING_TIME_SECONDS,
            self.process_withdrawal(ctx, account_id, amount).await
        )
    }
}
