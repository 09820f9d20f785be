//! Logging capability handed to the dispatcher.

use {
    crate::{context::RequestState, error::ErrorKind},
    rust_decimal::Decimal,
    std::{sync::Mutex, time::Duration},
    tracing::{error, info, warn},
    uuid::Uuid,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded { new_balance: Decimal },
    Failed {
        kind: ErrorKind,
        status: u16,
        cause_chain: Vec<String>,
    },
    /// The request was dropped before a response was produced.
    Cancelled { last_state: RequestState },
}

/// One record per request, whatever the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRecord {
    pub request_id: Uuid,
    pub account_id: Option<String>,
    pub outcome: Outcome,
    pub notes: Vec<String>,
    pub elapsed: Duration,
}

pub trait OutcomeLogger: Send + Sync {
    fn record(&self, record: OutcomeRecord);
}

/// Writes outcome records through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOutcomeLogger;

impl OutcomeLogger for TracingOutcomeLogger {
    fn record(&self, record: OutcomeRecord) {
        let account_id = record.account_id.as_deref().unwrap_or("-");
        let elapsed_ms = record.elapsed.as_secs_f64() * 1000.0;
        let notes = record.notes.join("; ");

        match &record.outcome {
            Outcome::Succeeded { new_balance } => info!(
                request_id = %record.request_id,
                account_id,
                status = 200,
                %new_balance,
                elapsed_ms,
                notes = %notes,
                "Withdrawal succeeded"
            ),
            Outcome::Failed {
                kind: ErrorKind::Unexpected,
                status,
                cause_chain,
            } => error!(
                request_id = %record.request_id,
                account_id,
                status,
                kind = ErrorKind::Unexpected.label(),
                cause_chain = %cause_chain.join(" <- "),
                elapsed_ms,
                notes = %notes,
                "Withdrawal failed unexpectedly"
            ),
            Outcome::Failed {
                kind,
                status,
                cause_chain,
            } => warn!(
                request_id = %record.request_id,
                account_id,
                status,
                kind = kind.label(),
                reason = cause_chain.first().map(String::as_str).unwrap_or_default(),
                elapsed_ms,
                notes = %notes,
                "Withdrawal rejected"
            ),
            Outcome::Cancelled { last_state } => warn!(
                request_id = %record.request_id,
                account_id,
                last_state = ?last_state,
                elapsed_ms,
                notes = %notes,
                "Withdrawal cancelled before completion"
            ),
        }
    }
}

/// Keeps records in memory instead of writing them anywhere.
#[derive(Debug, Default)]
pub struct RecordingOutcomeLogger {
    records: Mutex<Vec<OutcomeRecord>>,
}

impl RecordingOutcomeLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<OutcomeRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl OutcomeLogger for RecordingOutcomeLogger {
    fn record(&self, record: OutcomeRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
