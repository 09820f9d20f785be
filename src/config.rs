use {
    axum::http::StatusCode,
    chrono::TimeDelta,
    config::{Config, ConfigError, File, FileFormat},
    rust_decimal::Decimal,
    std::time::Duration,
};

#[derive(Clone, Debug, serde::Deserialize)]
pub struct TellerConfig {
    pub http: HttpConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Accounts opened in the in-memory store at startup.
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl TellerConfig {
    pub fn from_file(config_path: &str) -> Result<Self, ConfigError> {
        Self::build(File::new(config_path, FileFormat::Toml))
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::build(File::from_str(content, FileFormat::Toml))
    }

    fn build<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = Config::builder().add_source(source);

        let config: TellerConfig = builder.build()?.try_deserialize()?;
        config.store.cache_max_age()?;

        Ok(config)
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound on any single call into the account store.
    pub timeout_ms: u64,
    /// How long a cached balance may stand in for a failed lookup.
    pub cache_max_age_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_max_age(&self) -> Result<TimeDelta, ConfigError> {
        i64::try_from(self.cache_max_age_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "store.cache_max_age_secs is out of range: {}",
                    self.cache_max_age_secs
                ))
            })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            timeout_ms: 2_000,
            cache_max_age_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub insufficient_funds_status: InsufficientFundsStatus,
}

/// Status returned when a withdrawal exceeds the balance. Only 400 and 409
/// are accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "u16")]
pub enum InsufficientFundsStatus {
    BadRequest,
    #[default]
    Conflict,
}

impl InsufficientFundsStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            InsufficientFundsStatus::BadRequest => StatusCode::BAD_REQUEST,
            InsufficientFundsStatus::Conflict => StatusCode::CONFLICT,
        }
    }
}

impl TryFrom<u16> for InsufficientFundsStatus {
    type Error = String;

    fn try_from(status: u16) -> Result<Self, Self::Error> {
        match status {
            400 => Ok(InsufficientFundsStatus::BadRequest),
            409 => Ok(InsufficientFundsStatus::Conflict),
            other => Err(format!(
                "insufficient_funds_status must be 400 or 409, got {other}"
            )),
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct AccountSeed {
    pub id: String,
    pub balance: Decimal,
}
