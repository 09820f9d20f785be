use {
    crate::{
        config::TellerConfig,
        dispatcher::{Dispatcher, logger::TracingOutcomeLogger},
        http_server::{AppState, start_http_service},
        ledger::Ledger,
        models::Account,
        transaction_processor::TransactionProcessor,
    },
    ::config::ConfigError,
    std::sync::Arc,
    tokio::signal::ctrl_c,
    tracing::{error, info},
};

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod http_server;
pub mod ledger;
pub mod logging;
mod macros;
pub mod metrics;
pub mod models;
pub mod transaction_processor;
pub mod validation;

pub struct Teller {
    pub config: TellerConfig,
    pub ledger: Arc<Ledger>,
    pub transaction_processor: Arc<TransactionProcessor>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Teller {
    pub fn new(config: TellerConfig) -> Result<Self, ConfigError> {
        let ledger = Arc::new(Ledger::from_accounts(
            config
                .accounts
                .iter()
                .map(|seed| Account::new(seed.id.clone(), seed.balance)),
        ));

        let transaction_processor = Arc::new(TransactionProcessor::from_config(
            ledger.clone(),
            &config.store,
        )?);

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(TracingOutcomeLogger),
            config.policy.insufficient_funds_status,
        ));

        Ok(Teller {
            config,
            ledger,
            transaction_processor,
            dispatcher,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            processor: self.transaction_processor.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }

    pub async fn run(&mut self) -> Result<(), String> {
        let (shutdown_sender, _) = tokio::sync::broadcast::channel::<()>(1);
        let mut services = tokio::task::JoinSet::new();

        info!(
            "Initializing with {} accounts; insufficient funds maps to {}",
            self.ledger.accounts.len(),
            self.config.policy.insufficient_funds_status.status_code()
        );

        {
            let http_config = self.config.http.clone();
            let state = self.app_state();
            let shutdown_receiver = shutdown_sender.subscribe();
            services.spawn(async move {
                start_http_service(http_config, state, shutdown_receiver).await
            });
        }

        tokio::select! {
            _ = ctrl_c() => {
                info!("Shutdown signal received, stopping services...");
                shutdown_sender.send(()).map_err(|e| e.to_string())?;
                while services.join_next().await.is_some() {}
                info!("Services stopped");
            }
            Some(res) = services.join_next() => {
                error!("HTTP service exited unexpectedly: {:?}", res);
                return Err("HTTP service exited unexpectedly".to_string());
            }
        }

        Ok(())
    }
}
