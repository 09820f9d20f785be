use {
    crate::{
        config::HttpConfig,
        context::{RequestContext, RequestState},
        dispatcher::Dispatcher,
        error::WithdrawalError,
        models::WithdrawalRequest,
        transaction_processor::interface::TransactionProcessorInterface,
        validation::validate_withdrawal,
    },
    axum::{
        Json, Router,
        extract::{State, rejection::JsonRejection},
        response::Response,
        routing::post,
    },
    rust_decimal::Decimal,
    std::sync::Arc,
    tokio::net::TcpListener,
    tracing::{error, info},
};

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<dyn TransactionProcessorInterface>,
    pub dispatcher: Arc<Dispatcher>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/withdraw", post(withdraw))
        .with_state(state)
}

/// `POST /withdraw`
///
/// Whatever happens inside, the outcome goes to the dispatcher untouched.
pub async fn withdraw(
    State(state): State<AppState>,
    payload: Result<Json<WithdrawalRequest>, JsonRejection>,
) -> Response {
    let mut guard = state.dispatcher.begin();
    let outcome = handle_withdrawal(state.processor.as_ref(), &mut guard, payload).await;
    state.dispatcher.dispatch(guard, outcome)
}

async fn handle_withdrawal(
    processor: &dyn TransactionProcessorInterface,
    ctx: &mut RequestContext,
    payload: Result<Json<WithdrawalRequest>, JsonRejection>,
) -> Result<Decimal, WithdrawalError> {
    ctx.advance(RequestState::Validating);

    let Json(request) = payload.map_err(|rejection| {
        WithdrawalError::validation(
            "body",
            format!("is not a valid withdrawal request: {}", rejection.body_text()),
        )
    })?;
    ctx.set_account_id(&request.account_id);
    validate_withdrawal(&request)?;

    ctx.advance(RequestState::Processing);
    processor
        .withdraw(ctx, &request.account_id, request.amount)
        .await
}

pub async fn start_http_service(
    config: HttpConfig,
    state: AppState,
    mut shutdown_receiver: tokio::sync::broadcast::Receiver<()>,
) {
    let address = format!("{}:{}", config.address, config.port);
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind HTTP listener on {}: {}", address, e);
            return;
        }
    };

    let shutdown = async move {
        shutdown_receiver.recv().await.ok();
        info!("HTTP server is shutting down...");
    };

    info!("Initializing HTTP server at {}", address);

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!("Error in HTTP server: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            config::InsufficientFundsStatus, dispatcher::logger::RecordingOutcomeLogger,
            error::ErrorKind,
        },
        async_trait::async_trait,
        axum::{
            body::Body,
            http::{Request, StatusCode},
        },
        rust_decimal_macros::dec,
        std::sync::atomic::{AtomicUsize, Ordering},
        tower::ServiceExt,
    };

    /// Counts calls and always succeeds with a fixed balance.
    #[derive(Default)]
    struct CountingProcessor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TransactionProcessorInterface for CountingProcessor {
        async fn withdraw(
            &self,
            _ctx: &mut RequestContext,
            _account_id: &str,
            _amount: Decimal,
        ) -> Result<Decimal, WithdrawalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(dec!(1))
        }
    }

    fn test_app(processor: Arc<CountingProcessor>) -> (Router, Arc<RecordingOutcomeLogger>) {
        let logger = Arc::new(RecordingOutcomeLogger::new());
        let state = AppState {
            processor,
            dispatcher: Arc::new(Dispatcher::new(
                logger.clone(),
                InsufficientFundsStatus::Conflict,
            )),
        };
        (router(state), logger)
    }

    fn post_withdraw(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/withdraw")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_processor() {
        let processor = Arc::new(CountingProcessor::default());

        for body in [
            r#"{"accountId":"","amount":50}"#,
            r#"{"accountId":"   ","amount":50}"#,
            r#"{"accountId":"12345","amount":0}"#,
            r#"{"accountId":"12345","amount":-5}"#,
            r#"{"accountId":"12345"}"#,
            r#"not json"#,
        ] {
            let (app, logger) = test_app(processor.clone());
            let response = app.oneshot(post_withdraw(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let records = logger.records();
            assert_eq!(records.len(), 1);
            assert!(matches!(
                records[0].outcome,
                crate::dispatcher::logger::Outcome::Failed {
                    kind: ErrorKind::Validation,
                    ..
                }
            ));
        }

        assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_input_is_forwarded_once() {
        let processor = Arc::new(CountingProcessor::default());
        let (app, logger) = test_app(processor.clone());

        let response = app
            .oneshot(post_withdraw(r#"{"accountId":"12345","amount":50}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(logger.records().len(), 1);
    }
}
