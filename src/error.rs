//! Closed failure taxonomy shared by every stage of the withdrawal pipeline.
//!
//! Errors are created where a fault is first detected, may be re-wrapped with
//! extra context, and are consumed once by the dispatcher. Re-wrapping keeps
//! the previous error as `source()`, so the chain always leads back to the
//! original fault.

use {rust_decimal::Decimal, std::error::Error as StdError, thiserror::Error};

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Client-facing text for every unclassified failure.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";
pub const ACCOUNT_NOT_FOUND_MESSAGE: &str = "Account does not exist.";
pub const INSUFFICIENT_FUNDS_MESSAGE: &str = "Not enough funds for withdrawal.";
/// Server-side description of a store failure re-classified without extra context.
pub const STORE_FAILURE_MESSAGE: &str = "account store failure";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    AccountNotFound,
    InsufficientFunds,
    Unexpected,
}

impl ErrorKind {
    /// Machine-readable code carried in error response bodies.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorKind::Unexpected => "INTERNAL_ERROR",
        }
    }

    /// Short label used for metrics and log fields.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::AccountNotFound => "account_not_found",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::Unexpected => "unexpected",
        }
    }
}

#[derive(Debug, Error)]
pub enum WithdrawalError {
    #[error("{field} {reason}")]
    Validation { field: String, reason: String },
    #[error("account {account_id} does not exist")]
    AccountNotFound { account_id: String },
    #[error(
        "account {account_id} has insufficient funds: requested {requested}, available {available}"
    )]
    InsufficientFunds {
        account_id: String,
        requested: Decimal,
        available: Decimal,
    },
    #[error("{message}")]
    Unexpected {
        message: String,
        #[source]
        cause: BoxError,
    },
}

impl WithdrawalError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        WithdrawalError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn account_not_found(account_id: impl Into<String>) -> Self {
        WithdrawalError::AccountNotFound {
            account_id: account_id.into(),
        }
    }

    pub fn insufficient_funds(
        account_id: impl Into<String>,
        requested: Decimal,
        available: Decimal,
    ) -> Self {
        WithdrawalError::InsufficientFunds {
            account_id: account_id.into(),
            requested,
            available,
        }
    }

    /// Re-classifies a lower-level failure; the cause keeps the detail.
    pub fn unexpected(cause: impl Into<BoxError>) -> Self {
        WithdrawalError::Unexpected {
            message: STORE_FAILURE_MESSAGE.to_string(),
            cause: cause.into(),
        }
    }

    /// Classifies a lower-level failure and describes what was being attempted.
    pub fn wrap(context: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        WithdrawalError::Unexpected {
            message: context.into(),
            cause: cause.into(),
        }
    }

    /// Re-wraps this error as `Unexpected`, keeping it as the cause.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        WithdrawalError::wrap(context, self)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WithdrawalError::Validation { .. } => ErrorKind::Validation,
            WithdrawalError::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            WithdrawalError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            WithdrawalError::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// The only text about this error that may leave the process.
    pub fn client_message(&self) -> String {
        match self {
            WithdrawalError::Validation { .. } => self.to_string(),
            WithdrawalError::AccountNotFound { .. } => ACCOUNT_NOT_FOUND_MESSAGE.to_string(),
            WithdrawalError::InsufficientFunds { .. } => INSUFFICIENT_FUNDS_MESSAGE.to_string(),
            WithdrawalError::Unexpected { .. } => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }

    /// Display text of this error followed by every error in its source chain.
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut current = self.source();
        while let Some(cause) = current {
            chain.push(cause.to_string());
            current = cause.source();
        }
        chain
    }

    /// The first detected fault, or `self` when nothing is wrapped.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut root: &(dyn StdError + 'static) = self;
        while let Some(cause) = root.source() {
            root = cause;
        }
        root
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::ledger::error::LedgerError, rust_decimal_macros::dec};

    #[test]
    fn test_validation_message_names_field_and_reason() {
        let err = WithdrawalError::validation("accountId", "must not be blank");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.client_message(), "accountId must not be blank");
    }

    #[test]
    fn test_domain_errors_use_fixed_client_messages() {
        let not_found = WithdrawalError::account_not_found("99999");
        assert_eq!(not_found.client_message(), ACCOUNT_NOT_FOUND_MESSAGE);
        assert!(not_found.to_string().contains("99999"));

        let funds = WithdrawalError::insufficient_funds("12345", dec!(150), dec!(100));
        assert_eq!(funds.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(funds.client_message(), INSUFFICIENT_FUNDS_MESSAGE);
    }

    #[test]
    fn test_unexpected_masks_cause_for_clients() {
        let err = WithdrawalError::wrap(
            "failed to debit account 12345",
            LedgerError::Unavailable("connection reset by peer".to_string()),
        );

        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.client_message(), UNEXPECTED_ERROR_MESSAGE);
        assert!(!err.client_message().contains("connection reset"));
        assert_eq!(
            err.cause_chain(),
            vec![
                "failed to debit account 12345".to_string(),
                "account store unavailable: connection reset by peer".to_string(),
            ]
        );
    }

    #[test]
    fn test_unexpected_does_not_repeat_its_cause() {
        let err = WithdrawalError::unexpected(LedgerError::Timeout);
        assert_eq!(err.to_string(), STORE_FAILURE_MESSAGE);
        assert_eq!(
            err.cause_chain(),
            vec![
                STORE_FAILURE_MESSAGE.to_string(),
                "account store call timed out".to_string(),
            ]
        );
    }

    #[test]
    fn test_rewrapping_chains_instead_of_replacing() {
        let err = WithdrawalError::wrap("failed to debit account 1", LedgerError::Timeout)
            .with_context("withdrawal aborted");

        let chain = err.cause_chain();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0], "withdrawal aborted");
        assert_eq!(chain[1], "failed to debit account 1");
        assert_eq!(err.root_cause().to_string(), LedgerError::Timeout.to_string());
        assert!(err.root_cause().downcast_ref::<LedgerError>().is_some());
    }

    #[test]
    fn test_root_cause_of_unwrapped_error_is_itself() {
        let err = WithdrawalError::account_not_found("1");
        assert_eq!(err.root_cause().to_string(), err.to_string());
    }

    #[test]
    fn test_kind_codes_are_distinct() {
        let kinds = [
            ErrorKind::Validation,
            ErrorKind::AccountNotFound,
            ErrorKind::InsufficientFunds,
            ErrorKind::Unexpected,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
