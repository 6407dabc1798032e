//! Asynchronous request lifecycle around gateway calls.
//!
//! Each call runs on its own tokio task and moves through
//! `Pending -> Success | Error` exactly once. Calls are neither de-duplicated
//! nor cancelled, and a failed call is never retried.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use tokio::{sync::watch, task::JoinHandle};

use crate::Failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Add,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Logical key of a call, e.g. `add_expenses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationKey {
    pub resource: &'static str,
    pub operation: Operation,
}

impl MutationKey {
    pub fn new(resource: &'static str, operation: Operation) -> Self {
        Self {
            resource,
            operation,
        }
    }
}

impl fmt::Display for MutationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.operation.as_str(), self.resource)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Success,
    Error(Failure),
}

type SuccessFn<T> = Box<dyn FnOnce(T) + Send>;
type ErrorFn = Box<dyn FnOnce(Failure) + Send>;

/// Optional lifecycle callbacks of one call.
pub struct Callbacks<T> {
    on_success: Option<SuccessFn<T>>,
    on_error: Option<ErrorFn>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<T> Callbacks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, callback: impl FnOnce(T) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(Failure) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

/// Handle on a call issued through [`MutationCoordinator::run`].
///
/// Dropping the handle does not cancel the call.
#[derive(Debug)]
pub struct Mutation {
    key: MutationKey,
    phase: watch::Receiver<Phase>,
    task: JoinHandle<()>,
}

impl Mutation {
    pub fn key(&self) -> MutationKey {
        self.key
    }

    pub fn phase(&self) -> Phase {
        self.phase.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.phase.borrow(), Phase::Pending)
    }

    /// Waits for the call and its callbacks to finish and returns the final
    /// phase.
    pub async fn settled(self) -> Phase {
        match self.task.await {
            Ok(()) => self.phase.borrow().clone(),
            Err(err) => Phase::Error(Failure::Remote(err.to_string())),
        }
    }
}

/// Runs gateway calls as independent units of work.
#[derive(Debug, Clone, Default)]
pub struct MutationCoordinator {
    in_flight: Arc<AtomicUsize>,
}

impl MutationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls that have not settled yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Spawns `call`. On success the success callback receives the result, on
    /// failure the error callback receives the failure; the phase turns final
    /// once the callback returned.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run<T, F>(&self, key: MutationKey, call: F, callbacks: Callbacks<T>) -> Mutation
    where
        T: Send + 'static,
        F: Future<Output = Result<T, Failure>> + Send + 'static,
    {
        let (phase_tx, phase_rx) = watch::channel(Phase::Pending);
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(%key, "mutation pending");

        let Callbacks {
            on_success,
            on_error,
        } = callbacks;
        let task = tokio::spawn(async move {
            let phase = match call.await {
                Ok(value) => {
                    tracing::debug!(%key, "mutation succeeded");
                    if let Some(callback) = on_success {
                        callback(value);
                    }
                    Phase::Success
                }
                Err(failure) => {
                    tracing::warn!(%key, %failure, "mutation failed");
                    if let Some(callback) = on_error {
                        callback(failure.clone());
                    }
                    Phase::Error(failure)
                }
            };
            in_flight.fetch_sub(1, Ordering::SeqCst);
            phase_tx.send_replace(phase);
        });

        Mutation {
            key,
            phase: phase_rx,
            task,
        }
    }
}
