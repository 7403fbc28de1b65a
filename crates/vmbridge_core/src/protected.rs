//! Protected calls relayed through a trampoline.
//!
//! # Responsibility
//! - Pair a protected operation with a handler for one invocation.
//! - Let a trampoline, possibly implemented by the host, drive the pair
//!   through two entry points: `run_protected` and `run_handler`.
//!
//! # Invariants
//! - Each entry point runs its operation at most once per context.
//! - A raised error reaches the handler exactly once, even when it was left
//!   parked by a host whose throw returned.
//! - The handler only runs while the protected operation is `Running`: never
//!   before it started and never after it completed.
//! - A context lives only for the duration of one `protected_call`.
//!
//! # Handler failures
//! A panicking handler is not caught here. It unwinds into the trampoline and
//! from there to the caller of `protected_call`; at a C boundary the export
//! wrapper turns it into the export's failure value.

use log::{error, warn};

/// Lifecycle of one protected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Terminal result reported to the caller of [`protected_call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// Protected operation returned normally; handler not invoked.
    Completed,
    /// Protected operation raised; handler invoked with the error.
    Failed,
    /// Trampoline returned without finishing the protocol.
    Abandoned,
}

type ProtectedOp<'a, E> = Box<dyn FnOnce() -> Result<(), E> + 'a>;
type HandlerOp<'a, E> = Box<dyn FnOnce(E) + 'a>;

/// Protected and handler operations for one invocation.
pub struct ProtectedCallContext<'a, E> {
    protected: Option<ProtectedOp<'a, E>>,
    handler: Option<HandlerOp<'a, E>>,
    parked: Option<E>,
    state: CallState,
}

impl<'a, E> ProtectedCallContext<'a, E> {
    pub fn new(
        protected: impl FnOnce() -> Result<(), E> + 'a,
        handler: impl FnOnce(E) + 'a,
    ) -> Self {
        Self {
            protected: Some(Box::new(protected)),
            handler: Some(Box::new(handler)),
            parked: None,
            state: CallState::Idle,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    /// Runs the protected operation.
    ///
    /// Returns `None` when the context has left `Idle`. On `Some(Err(_))` the
    /// trampoline owns the error and must route it to
    /// [`run_handler`](Self::run_handler).
    pub fn run_protected(&mut self) -> Option<Result<(), E>> {
        if self.state != CallState::Idle {
            return None;
        }
        let protected = self.protected.take()?;
        self.state = CallState::Running;
        let result = protected();
        if result.is_ok() {
            self.state = CallState::Completed;
        }
        Some(result)
    }

    /// Runs the handler with a caught error.
    ///
    /// Only a raising protected operation (state `Running`) accepts a handler
    /// call; otherwise returns `false` without running anything.
    pub fn run_handler(&mut self, error: E) -> bool {
        if self.state != CallState::Running {
            return false;
        }
        let Some(handler) = self.handler.take() else {
            return false;
        };
        self.parked = None;
        self.state = CallState::Failed;
        handler(error);
        true
    }

    /// Stores a raised error inside the context while control leaves through
    /// a host throw; returns a reference the host can carry as its payload.
    pub fn park_error(&mut self, error: E) -> &E {
        self.parked.insert(error)
    }

    pub fn take_parked_error(&mut self) -> Option<E> {
        self.parked.take()
    }

    /// Runs the handler with the parked error, if any.
    ///
    /// The error stays parked when the context is not `Running`.
    pub fn run_parked_handler(&mut self) -> bool {
        if self.state != CallState::Running {
            return false;
        }
        match self.parked.take() {
            Some(error) => self.run_handler(error),
            None => false,
        }
    }

    fn outcome(&self) -> CallOutcome {
        match self.state {
            CallState::Completed => CallOutcome::Completed,
            CallState::Failed => CallOutcome::Failed,
            CallState::Idle | CallState::Running => CallOutcome::Abandoned,
        }
    }
}

/// Performs the actual try/catch around a context.
///
/// Implementations call `run_protected` once and, if it raised, deliver the
/// error to `run_handler`.
pub trait Trampoline<E> {
    fn try_catch(&self, context: &mut ProtectedCallContext<'_, E>);
}

/// Trampoline for targets where errors return through ordinary calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectTrampoline;

impl<E> Trampoline<E> for DirectTrampoline {
    fn try_catch(&self, context: &mut ProtectedCallContext<'_, E>) {
        if let Some(Err(error)) = context.run_protected() {
            context.run_handler(error);
        }
    }
}

/// Runs `protected` through `trampoline`, sending a raised error to
/// `handler`.
pub fn protected_call<'a, E, T>(
    trampoline: &T,
    protected: impl FnOnce() -> Result<(), E> + 'a,
    handler: impl FnOnce(E) + 'a,
) -> CallOutcome
where
    T: Trampoline<E> + ?Sized,
{
    let mut context = ProtectedCallContext::new(protected, handler);
    trampoline.try_catch(&mut context);
    // A host whose throw returned leaves the raised error parked.
    if context.outcome() == CallOutcome::Abandoned && context.run_parked_handler() {
        warn!(
            "event=protected_call module=protected status=recovered reason=error_left_parked"
        );
    }
    let outcome = context.outcome();
    match outcome {
        CallOutcome::Completed => {}
        CallOutcome::Failed => {
            warn!("event=protected_call module=protected status=failed");
        }
        CallOutcome::Abandoned => {
            error!(
                "event=protected_call module=protected status=abandoned state={:?} error_parked={}",
                context.state(),
                context.parked.is_some()
            );
        }
    }
    outcome
}
