//! Central dispatcher: the single place where a withdrawal outcome becomes an
//! HTTP response and a log record.
//!
//! A request acquires an [`OutcomeGuard`] before anything else runs. The guard
//! owns the request context; [`Dispatcher::dispatch`] consumes it and writes
//! the record. If the handler future is dropped first (client disconnect,
//! deadline) the guard writes a cancellation record from `Drop` instead, so
//! every request produces exactly one record.

pub mod logger;

use {
    crate::{
        config::InsufficientFundsStatus,
        context::{RequestContext, RequestState},
        dispatcher::logger::{Outcome, OutcomeLogger, OutcomeRecord},
        error::{ErrorKind, WithdrawalError},
        metrics::{WITHDRAWALS_CANCELLED_TOTAL, WITHDRAWALS_FAILED_TOTAL, WITHDRAWALS_SUCCEEDED_TOTAL},
        models::{ErrorResponse, WithdrawalResponse},
    },
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    rust_decimal::Decimal,
    std::{
        ops::{Deref, DerefMut},
        sync::Arc,
    },
};

pub struct Dispatcher {
    logger: Arc<dyn OutcomeLogger>,
    insufficient_funds_status: InsufficientFundsStatus,
}

impl Dispatcher {
    pub fn new(
        logger: Arc<dyn OutcomeLogger>,
        insufficient_funds_status: InsufficientFundsStatus,
    ) -> Self {
        Dispatcher {
            logger,
            insufficient_funds_status,
        }
    }

    /// Starts a request; the returned guard must be handed back to `dispatch`.
    pub fn begin(&self) -> OutcomeGuard {
        OutcomeGuard {
            context: RequestContext::new(),
            logger: Arc::clone(&self.logger),
            finished: false,
        }
    }

    pub fn status_for(&self, kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::AccountNotFound => StatusCode::NOT_FOUND,
            ErrorKind::InsufficientFunds => self.insufficient_funds_status.status_code(),
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders a failure for the client. Nothing from the cause chain of an
    /// unexpected error is included.
    pub fn render_error(&self, error: &WithdrawalError) -> (StatusCode, ErrorResponse) {
        let kind = error.kind();
        let body = ErrorResponse {
            code: kind.code(),
            message: error.client_message(),
        };
        (self.status_for(kind), body)
    }

    pub fn dispatch(
        &self,
        mut guard: OutcomeGuard,
        outcome: Result<Decimal, WithdrawalError>,
    ) -> Response {
        match outcome {
            Ok(new_balance) => {
                WITHDRAWALS_SUCCEEDED_TOTAL.inc();
                guard.context.advance(RequestState::Succeeded);
                guard.write(Outcome::Succeeded { new_balance });

                (StatusCode::OK, Json(WithdrawalResponse { new_balance })).into_response()
            }
            Err(error) => {
                let kind = error.kind();
                let (status, body) = self.render_error(&error);

                WITHDRAWALS_FAILED_TOTAL.with_label_values(&[kind.label()]).inc();
                guard.context.advance(RequestState::Failed(kind));
                guard.context.advance(RequestState::Responded);
                guard.write(Outcome::Failed {
                    kind,
                    status: status.as_u16(),
                    cause_chain: error.cause_chain(),
                });

                (status, Json(body)).into_response()
            }
        }
    }
}

/// Scoped ownership of a request's context that guarantees one outcome record.
pub struct OutcomeGuard {
    context: RequestContext,
    logger: Arc<dyn OutcomeLogger>,
    finished: bool,
}

impl OutcomeGuard {
    fn write(&mut self, outcome: Outcome) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.logger.record(OutcomeRecord {
            request_id: self.context.request_id,
            account_id: self.context.account_id().map(str::to_string),
            outcome,
            notes: self.context.notes().to_vec(),
            elapsed: self.context.elapsed(),
        });
    }
}

impl Deref for OutcomeGuard {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl DerefMut for OutcomeGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.context
    }
}

impl Drop for OutcomeGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let last_state = self.context.state();
        self.context.advance(RequestState::Cancelled);
        WITHDRAWALS_CANCELLED_TOTAL.inc();
        self.write(Outcome::Cancelled { last_state });
    }
}
