//! Per-form state machine. Transitions are pure; `FormStateCell` owns the
//! current value for one form instance.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use shared::{domain::FormKind, error::SubmissionError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Error,
}

impl FormState {
    pub fn is_in_flight(self) -> bool {
        self == Self::Submitting
    }

    fn is_unresolved(self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Submit,
    ValidationFailed,
    ValidationPassed,
    Resolved { success: bool },
    /// The submit was dropped before it resolved.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no transition from {from} on {event:?}")]
pub struct InvalidTransition {
    pub from: FormState,
    pub event: FormEvent,
}

pub fn transition(from: FormState, event: FormEvent) -> Result<FormState, InvalidTransition> {
    use FormEvent::*;
    use FormState::*;

    match (from, event) {
        (Idle | Success | Error, Submit) => Ok(Validating),
        (Validating, ValidationFailed) => Ok(Idle),
        (Validating, ValidationPassed) => Ok(Submitting),
        (Submitting, Resolved { success: true }) => Ok(Success),
        (Submitting, Resolved { success: false }) => Ok(Error),
        (Validating | Submitting, Abandoned) => Ok(Error),
        _ => Err(InvalidTransition { from, event }),
    }
}

/// Current state of one form. A submit that arrives while the previous one
/// is still validating or in flight is refused with `SubmissionError::Busy`.
#[derive(Debug)]
pub struct FormStateCell {
    kind: FormKind,
    state: Mutex<FormState>,
}

impl FormStateCell {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            state: Mutex::new(FormState::Idle),
        }
    }

    pub fn get(&self) -> FormState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the form for one submit. `on_abandon` runs if the returned
    /// guard is dropped while the submit is still unresolved.
    pub fn begin<'a>(
        &'a self,
        on_abandon: impl FnOnce() + Send + Sync + 'a,
    ) -> Result<InFlight<'a>, SubmissionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *state;
        let next = transition(from, FormEvent::Submit).map_err(|err| {
            debug!(form = %self.kind, %err, "submit refused");
            SubmissionError::Busy
        })?;
        debug!(form = %self.kind, %from, to = %next, "form state");
        *state = next;

        Ok(InFlight {
            cell: self,
            on_abandon: Some(Box::new(on_abandon)),
        })
    }

    fn advance(&self, event: FormEvent) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *state;
        match transition(from, event) {
            Ok(next) => {
                debug!(form = %self.kind, %from, to = %next, "form state");
                *state = next;
            }
            Err(err) => warn!(form = %self.kind, %err, "ignored out-of-order form event"),
        }
    }
}

/// Held by a submit from `begin` until it resolves. Dropping it early, e.g.
/// when the caller times out, moves the form to `Error` so it can be retried.
pub struct InFlight<'a> {
    cell: &'a FormStateCell,
    on_abandon: Option<Box<dyn FnOnce() + Send + Sync + 'a>>,
}

impl InFlight<'_> {
    pub fn advance(&self, event: FormEvent) {
        self.cell.advance(event);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.cell.get().is_unresolved() {
            return;
        }
        warn!(form = %self.cell.kind, "submit dropped before it resolved");
        self.cell.advance(FormEvent::Abandoned);
        if let Some(on_abandon) = self.on_abandon.take() {
            on_abandon();
        }
    }
}
