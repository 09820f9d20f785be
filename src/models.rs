use {
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
};

/// Account as held by the account store.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(id: impl Into<String>, balance: Decimal) -> Self {
        Account {
            id: id.into(),
            balance,
        }
    }
}

/// Body of `POST /withdraw`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub account_id: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub new_balance: Decimal,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}
