//! In-memory account store.

pub mod error;
pub mod interface;

use {
    crate::{
        ledger::{error::LedgerError, interface::LedgerInterface},
        models::Account,
    },
    async_trait::async_trait,
    dashmap::DashMap,
    rust_decimal::Decimal,
};

pub struct Ledger {
    pub accounts: DashMap<String, Account>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DashMap::new())
    }
}

impl Ledger {
    pub fn new(accounts: DashMap<String, Account>) -> Self {
        Ledger { accounts }
    }

    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self::new(
            accounts
                .into_iter()
                .map(|account| (account.id.clone(), account))
                .collect(),
        )
    }

    /// Opens an account, replacing any existing account with the same id.
    pub fn open_account(&self, id: impl Into<String>, balance: Decimal) {
        let account = Account::new(id, balance);
        self.accounts.insert(account.id.clone(), account);
    }

    pub fn get_account(&self, id: &str) -> Result<Account, LedgerError> {
        match self.accounts.get(id) {
            Some(entry) => Ok(entry.value().clone()),
            None => Err(LedgerError::AccountNotFound),
        }
    }
}

#[async_trait]
impl LedgerInterface for Ledger {
    async fn get_balance(&self, account_id: &str) -> Result<Decimal, LedgerError> {
        self.get_account(account_id).map(|account| account.balance)
    }

    async fn debit(&self, account_id: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        // The shard lock serializes debits on the same account.
        let mut account = self
            .accounts
            .get_mut(account_id)
            .ok_or(LedgerError::AccountNotFound)?;

        if account.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                available: account.balance,
            });
        }

        account.balance -= amount;

        Ok(account.balance)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rust_decimal_macros::dec, std::sync::Arc};

    #[tokio::test]
    async fn test_get_balance_of_existing_account() {
        let ledger = Ledger::from_accounts([Account::new("12345", dec!(100))]);
        assert_eq!(ledger.get_balance("12345").await, Ok(dec!(100)));
    }

    #[tokio::test]
    async fn test_get_balance_of_missing_account() {
        let ledger = Ledger::default();
        assert_eq!(
            ledger.get_balance("99999").await,
            Err(LedgerError::AccountNotFound)
        );
    }

    #[tokio::test]
    async fn test_debit_updates_balance() {
        let ledger = Ledger::default();
        ledger.open_account("12345", dec!(100));

        assert_eq!(ledger.debit("12345", dec!(50)).await, Ok(dec!(50)));
        assert_eq!(ledger.get_account("12345").unwrap().balance, dec!(50));
    }

    #[tokio::test]
    async fn test_debit_rejects_overdraft_without_change() {
        let ledger = Ledger::default();
        ledger.open_account("12345", dec!(100));

        assert_eq!(
            ledger.debit("12345", dec!(150)).await,
            Err(LedgerError::InsufficientFunds {
                available: dec!(100)
            })
        );
        assert_eq!(ledger.get_account("12345").unwrap().balance, dec!(100));
    }

    #[tokio::test]
    async fn test_concurrent_debits_never_overdraw() {
        let ledger = Arc::new(Ledger::default());
        ledger.open_account("12345", dec!(100));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..25 {
            let ledger = Arc::clone(&ledger);
            tasks.spawn(async move { ledger.debit("12345", dec!(10)).await });
        }

        let mut succeeded = 0;
        while let Some(result) = tasks.join_next().await {
            if result.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 10);
        assert_eq!(ledger.get_account("12345").unwrap().balance, dec!(0));
    }
}
