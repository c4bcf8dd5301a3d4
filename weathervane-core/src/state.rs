//! The orchestrator's single observable state value.

use tokio::sync::watch;

use crate::error::ErrorKind;
use crate::model::WeatherRecord;

/// Exactly one variant is active at any time. Callers read it (or subscribe
/// to changes) and decide how to render it; they never mutate it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    Loading {
        key: String,
    },
    Success {
        record: WeatherRecord,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl OrchestratorState {
    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            OrchestratorState::Success { record } => Some(record),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, OrchestratorState::Loading { .. })
    }
}

/// Publish/subscribe container around the state, decoupled from any UI
/// framework. Subscribers get a `watch::Receiver` and observe the latest
/// value; intermediate values may be skipped, which matches the
/// last-request-wins contract.
#[derive(Debug)]
pub struct StateCell {
    tx: watch::Sender<OrchestratorState>,
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(OrchestratorState::Idle);
        Self { tx }
    }

    pub fn publish(&self, state: OrchestratorState) {
        // send_replace keeps working with zero subscribers.
        self.tx.send_replace(state);
    }

    pub fn current(&self) -> OrchestratorState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.tx.subscribe()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
