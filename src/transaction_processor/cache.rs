use {
    chrono::{DateTime, TimeDelta, Utc},
    dashmap::DashMap,
    rust_decimal::Decimal,
};

#[derive(Debug, Clone, Copy)]
struct CachedBalance {
    balance: Decimal,
    observed_at: DateTime<Utc>,
}

/// Last balance seen per account, used to keep serving lookups while the
/// account store is briefly unreachable.
pub struct BalanceCache {
    entries: DashMap<String, CachedBalance>,
    max_age: TimeDelta,
}

impl BalanceCache {
    pub fn new(max_age: TimeDelta) -> Self {
        BalanceCache {
            entries: DashMap::new(),
            max_age,
        }
    }

    pub fn store(&self, account_id: &str, balance: Decimal) {
        self.entries.insert(
            account_id.to_string(),
            CachedBalance {
                balance,
                observed_at: Utc::now(),
            },
        );
    }

    /// Returns the cached balance if it is younger than the configured max age.
    pub fn fresh(&self, account_id: &str) -> Option<Decimal> {
        let entry = self.entries.get(account_id)?;
        if Utc::now() - entry.observed_at > self.max_age {
            return None;
        }
        Some(entry.balance)
    }

    pub fn invalidate(&self, account_id: &str) {
        self.entries.remove(account_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rust_decimal_macros::dec};

    #[test]
    fn test_fresh_entry_is_returned() {
        let cache = BalanceCache::new(TimeDelta::seconds(30));
        cache.store("12345", dec!(100));
        assert_eq!(cache.fresh("12345"), Some(dec!(100)));
        assert_eq!(cache.fresh("99999"), None);
    }

    #[test]
    fn test_stale_entry_is_ignored() {
        let cache = BalanceCache::new(TimeDelta::zero());
        cache.store("12345", dec!(100));
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(cache.fresh("12345"), None);
    }

    #[test]
    fn test_store_overwrites_and_invalidate_removes() {
        let cache = BalanceCache::new(TimeDelta::seconds(30));
        cache.store("12345", dec!(100));
        cache.store("12345", dec!(40));
        assert_eq!(cache.fresh("12345"), Some(dec!(40)));
        assert_eq!(cache.len(), 1);

        cache.invalidate("12345");
        assert!(cache.is_empty());
    }
}
