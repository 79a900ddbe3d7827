//! Fire-and-forget follow-up work scheduled from the dispatch path.
//!
//! Dispatch never awaits a side effect. Outcomes are only observable through
//! the failure sink returned by [`SideEffectRunner::new`].

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::domain::errors::ApiError;

/// Why a side effect did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SideEffectError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("no async runtime available to run the task")]
    NoRuntime,
}

/// A failed side effect, as delivered to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffectFailure {
    /// Human-readable label given at scheduling time.
    pub task: String,
    /// Why it failed.
    pub error: SideEffectError,
}

/// Spawns side effects on the tokio runtime and reports their failures.
#[derive(Debug, Clone)]
pub struct SideEffectRunner {
    handle: Option<Handle>,
    failures: mpsc::UnboundedSender<SideEffectFailure>,
}

impl SideEffectRunner {
    /// Creates a runner bound to the current runtime, if any, along with the
    /// receiving end of its failure sink.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SideEffectFailure>) {
        let (failures, rx) = mpsc::unbounded_channel();
        let runner = Self {
            handle: Handle::try_current().ok(),
            failures,
        };
        (runner, rx)
    }

    /// Pins the runner to `handle` instead of the ambient runtime.
    #[must_use]
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Schedules `future` without waiting for it.
    ///
    /// Errors and panics are caught, logged and sent to the failure sink;
    /// they never reach the caller or sibling tasks. Returns `None` when no
    /// runtime is available, after reporting [`SideEffectError::NoRuntime`].
    pub fn schedule<F>(&self, task: impl Into<String>, future: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let task = task.into();

        let Some(handle) = self.handle.clone().or_else(|| Handle::try_current().ok()) else {
            warn!(task = %task, "Dropping side effect, no runtime");
            self.report(task, SideEffectError::NoRuntime);
            return None;
        };

        let failures = self.failures.clone();
        debug!(task = %task, "Scheduling side effect");

        Some(handle.spawn(async move {
            let outcome = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(())) => {
                    debug!(task = %task, "Side effect completed");
                    return;
                }
                Ok(Err(err)) => SideEffectError::Api(err),
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    SideEffectError::Panicked(panic_msg)
                }
            };

            error!(task = %task, error = %outcome, "Side effect failed");
            let _ = failures.send(SideEffectFailure {
                task,
                error: outcome,
            });
        }))
    }

    fn report(&self, task: String, error: SideEffectError) {
        let _ = self.failures.send(SideEffectFailure { task, error });
    }
}
