use std::cell::{Cell, RefCell};
use vmbridge_core::{protected_call, CallOutcome, DirectTrampoline};

#[derive(Debug, Clone, PartialEq, Eq)]
struct VmError {
    status: i32,
    message: String,
}

fn fail(step: &Cell<u32>) -> Result<(), VmError> {
    step.set(1);
    Err(VmError {
        status: 2,
        message: "attempt to index nil".to_string(),
    })
}

#[test]
fn raised_error_reaches_handler_exactly_once() {
    let step = Cell::new(0);
    let after_raise = Cell::new(false);
    let received = RefCell::new(Vec::new());

    let outcome = protected_call(
        &DirectTrampoline,
        || {
            fail(&step)?;
            after_raise.set(true);
            Ok(())
        },
        |error: VmError| received.borrow_mut().push(error),
    );

    assert_eq!(outcome, CallOutcome::Failed);
    assert_eq!(step.get(), 1);
    assert!(!after_raise.get());
    assert_eq!(
        received.into_inner(),
        vec![VmError {
            status: 2,
            message: "attempt to index nil".to_string()
        }]
    );
}

#[test]
fn completed_call_never_invokes_handler() {
    let ran = Cell::new(false);
    let handled = Cell::new(0);

    let outcome = protected_call(
        &DirectTrampoline,
        || {
            ran.set(true);
            Ok::<(), VmError>(())
        },
        |_| handled.set(handled.get() + 1),
    );

    assert_eq!(outcome, CallOutcome::Completed);
    assert!(ran.get());
    assert_eq!(handled.get(), 0);
}

#[test]
fn nested_protected_calls_are_independent() {
    let inner_errors = Cell::new(0);
    let outer_errors = Cell::new(0);

    let outcome = protected_call(
        &DirectTrampoline,
        || {
            let inner = protected_call(
                &DirectTrampoline,
                || Err::<(), i32>(1),
                |_| inner_errors.set(inner_errors.get() + 1),
            );
            assert_eq!(inner, CallOutcome::Failed);
            Err::<(), i32>(2)
        },
        |code| outer_errors.set(code),
    );

    assert_eq!(outcome, CallOutcome::Failed);
    assert_eq!(inner_errors.get(), 1);
    assert_eq!(outer_errors.get(), 2);
}
