//! Process-wide assertion failure hook.
//!
//! # Responsibility
//! - Route failed internal consistency checks to one installed handler.
//! - Let the handler decide whether the runtime continues or aborts.
//!
//! # Invariants
//! - With no handler installed, failures resolve to `AssertAction::Abort`.
//! - The default handler prints one diagnostic line before deciding.

use log::error;
use std::fmt::{Display, Formatter};
use std::sync::RwLock;

/// Handler decision for one failed assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertAction {
    Continue,
    Abort,
}

impl AssertAction {
    /// C status code: `0` continue, `1` abort.
    pub fn as_status(self) -> i32 {
        match self {
            Self::Continue => 0,
            Self::Abort => 1,
        }
    }
}

/// Location and text of one failed assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertionFailure<'a> {
    pub expression: &'a str,
    pub file: &'a str,
    pub line: u32,
    pub function: &'a str,
}

impl Display for AssertionFailure<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}): ASSERTION FAILED: {}",
            self.file, self.line, self.expression
        )
    }
}

pub type AssertionHandler = fn(&AssertionFailure<'_>) -> AssertAction;

static HANDLER: RwLock<Option<AssertionHandler>> = RwLock::new(None);

/// Installs `handler`, returning the previously installed one.
pub fn install_handler(handler: AssertionHandler) -> Option<AssertionHandler> {
    let mut slot = HANDLER.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    slot.replace(handler)
}

/// Installs [`default_handler`].
pub fn install_default_handler() -> Option<AssertionHandler> {
    install_handler(default_handler)
}

/// Removes the installed handler.
pub fn clear_handler() -> Option<AssertionHandler> {
    let mut slot = HANDLER.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    slot.take()
}

pub fn handler_installed() -> bool {
    HANDLER
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .is_some()
}

/// Prints the failure, logs it and asks the runtime to abort.
pub fn default_handler(failure: &AssertionFailure<'_>) -> AssertAction {
    println!("{failure}");
    error!(
        "event=assertion_failed module=assertion status=error file={} line={} function={}",
        failure.file, failure.line, failure.function
    );
    AssertAction::Abort
}

/// Reports one failed assertion to the installed handler.
pub fn report_failure(failure: &AssertionFailure<'_>) -> AssertAction {
    // Copy the fn pointer out so the handler runs without the lock held.
    let handler = *HANDLER.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    match handler {
        Some(handler) => handler(failure),
        None => {
            error!(
                "event=assertion_failed module=assertion status=unhandled file={} line={}",
                failure.file, failure.line
            );
            AssertAction::Abort
        }
    }
}

/// Checks a runtime invariant and reports failures to the assertion hook.
///
/// Aborts the process when the handler answers `AssertAction::Abort`.
#[macro_export]
macro_rules! vm_assert {
    ($cond:expr $(,)?) => {
        if !$cond {
            let failure = $crate::assertion::AssertionFailure {
                expression: stringify!($cond),
                file: file!(),
                line: line!(),
                function: module_path!(),
            };
            if $crate::assertion::report_failure(&failure) == $crate::assertion::AssertAction::Abort
            {
                ::std::process::abort();
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::{
        clear_handler, handler_installed, install_default_handler, install_handler,
        report_failure, AssertAction, AssertionFailure,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // Handler slot is process-wide; tests touching it run one at a time.
    static SLOT_LOCK: Mutex<()> = Mutex::new(());
    static CONTINUE_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn continue_handler(_failure: &AssertionFailure<'_>) -> AssertAction {
        CONTINUE_CALLS.fetch_add(1, Ordering::SeqCst);
        AssertAction::Continue
    }

    fn failure() -> AssertionFailure<'static> {
        AssertionFailure {
            expression: "top <= limit",
            file: "ldo.rs",
            line: 42,
            function: "grow_stack",
        }
    }

    #[test]
    fn display_matches_diagnostic_line() {
        assert_eq!(
            failure().to_string(),
            "ldo.rs(42): ASSERTION FAILED: top <= limit"
        );
    }

    #[test]
    fn unhandled_failures_abort() {
        let _guard = SLOT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_handler();
        assert!(!handler_installed());
        assert_eq!(report_failure(&failure()), AssertAction::Abort);
    }

    #[test]
    fn installed_handler_decides_and_previous_is_returned() {
        let _guard = SLOT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_handler();
        assert!(install_default_handler().is_none());
        assert_eq!(report_failure(&failure()), AssertAction::Abort);

        let previous = install_handler(continue_handler);
        assert!(previous.is_some());
        let before = CONTINUE_CALLS.load(Ordering::SeqCst);
        assert_eq!(report_failure(&failure()), AssertAction::Continue);
        assert_eq!(CONTINUE_CALLS.load(Ordering::SeqCst), before + 1);
        clear_handler();
    }

    #[test]
    fn vm_assert_reports_only_false_conditions() {
        let _guard = SLOT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        install_handler(continue_handler);
        let before = CONTINUE_CALLS.load(Ordering::SeqCst);

        crate::vm_assert!(1 + 1 == 2);
        assert_eq!(CONTINUE_CALLS.load(Ordering::SeqCst), before);

        crate::vm_assert!(1 + 1 == 3);
        assert_eq!(CONTINUE_CALLS.load(Ordering::SeqCst), before + 1);
        clear_handler();
    }

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(AssertAction::Continue.as_status(), 0);
        assert_eq!(AssertAction::Abort.as_status(), 1);
    }
}
