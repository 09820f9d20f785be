//! Per-request state shared by the pipeline stages.

use {
    crate::error::ErrorKind,
    chrono::{DateTime, Utc},
    std::time::{Duration, Instant},
    uuid::Uuid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Validating,
    Processing,
    Succeeded,
    Failed(ErrorKind),
    Responded,
    Cancelled,
}

impl RequestState {
    /// Forward-only transitions; there are no retries or backward moves.
    pub fn can_advance_to(self, next: RequestState) -> bool {
        use RequestState::*;
        match (self, next) {
            (Received, Validating) => true,
            (Validating, Processing) => true,
            (Validating | Processing, Succeeded | Failed(_)) => true,
            (Failed(_), Responded) => true,
            (Received | Validating | Processing, Cancelled) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Succeeded | RequestState::Responded | RequestState::Cancelled
        )
    }
}

#[derive(Debug)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub received_at: DateTime<Utc>,
    started: Instant,
    state: RequestState,
    account_id: Option<String>,
    notes: Vec<String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        RequestContext {
            request_id: Uuid::new_v4(),
            received_at: Utc::now(),
            started: Instant::now(),
            state: RequestState::Received,
            account_id: None,
            notes: Vec::new(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Moves to `next`, returning false and staying put if the move is not allowed.
    pub fn advance(&mut self, next: RequestState) -> bool {
        if !self.state.can_advance_to(next) {
            return false;
        }
        self.state = next;
        true
    }

    pub fn set_account_id(&mut self, account_id: &str) {
        self.account_id = Some(account_id.to_string());
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Attaches a diagnostic line to the request's outcome record.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
