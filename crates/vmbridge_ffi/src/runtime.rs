//! C pass-throughs to runtime internals.
//!
//! The runtime registers its internal routines once through
//! `vmbridge_install_runtime_hooks`; each pass-through forwards to them via
//! [`VmInternals`]. A missing hook makes the pass-through a logged no-op.

use crate::boundary::guard;
use log::warn;
use once_cell::sync::OnceCell;
use std::ffi::c_int;
use vmbridge_core::runtime::{self, VmInternals};

/// Opaque runtime state handle.
#[repr(C)]
pub struct VmState {
    _private: [u8; 0],
}

/// Runtime routines backing the pass-throughs.
///
/// Stack positions are slot indices relative to the stack base.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RuntimeHooks {
    pub check_stack: Option<unsafe extern "C" fn(state: *mut VmState, slots: c_int)>,
    pub stack_top: Option<unsafe extern "C" fn(state: *mut VmState) -> usize>,
    pub expand_stack_limit: Option<unsafe extern "C" fn(state: *mut VmState, target: usize)>,
    pub is_native: Option<unsafe extern "C" fn(state: *mut VmState, level: c_int) -> c_int>,
}

static RUNTIME_HOOKS: OnceCell<RuntimeHooks> = OnceCell::new();

/// Registers the runtime's hooks; only the first call takes effect.
///
/// Returns `true` when `hooks` was installed.
///
/// # Safety
/// `hooks` must be null or point to a valid `RuntimeHooks`; every non-null
/// function must stay callable for the rest of the process.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_install_runtime_hooks(hooks: *const RuntimeHooks) -> bool {
    let Some(hooks) = hooks.as_ref() else {
        return false;
    };
    RUNTIME_HOOKS.set(*hooks).is_ok()
}

/// One runtime state seen through the installed hooks.
struct HookedVm {
    hooks: RuntimeHooks,
    state: *mut VmState,
}

impl HookedVm {
    fn current(state: *mut VmState, export: &'static str) -> Option<Self> {
        if state.is_null() {
            return None;
        }
        match RUNTIME_HOOKS.get() {
            Some(hooks) => Some(Self {
                hooks: *hooks,
                state,
            }),
            None => {
                warn!("event=runtime_passthrough module=ffi status=no_hooks export={export}");
                None
            }
        }
    }
}

// SAFETY (all methods): `state` is the non-null handle the runtime passed in,
// and the hooks were registered by that runtime.
impl VmInternals for HookedVm {
    fn check_stack(&mut self, slots: i32) {
        if let Some(hook) = self.hooks.check_stack {
            unsafe { hook(self.state, slots) }
        }
    }

    fn stack_top(&self) -> usize {
        match self.hooks.stack_top {
            Some(hook) => unsafe { hook(self.state) },
            None => 0,
        }
    }

    fn expand_stack_limit_to(&mut self, target: usize) {
        if let Some(hook) = self.hooks.expand_stack_limit {
            unsafe { hook(self.state, target) }
        }
    }

    fn is_native(&self, level: i32) -> bool {
        match self.hooks.is_native {
            Some(hook) => unsafe { hook(self.state, level) != 0 },
            None => false,
        }
    }
}

/// Forwards to the runtime's stack check.
///
/// # Safety
/// `state` must be null or a live runtime state handle.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_check_stack(state: *mut VmState, slots: c_int) {
    guard("vmbridge_check_stack", (), || {
        if let Some(mut vm) = HookedVm::current(state, "vmbridge_check_stack") {
            runtime::check_stack(&mut vm, slots);
        }
    });
}

/// Expands the runtime's stack limit to `slots` past the current top.
///
/// # Safety
/// `state` must be null or a live runtime state handle.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_expand_stack_limit(state: *mut VmState, slots: c_int) {
    guard("vmbridge_expand_stack_limit", (), || {
        if let Some(mut vm) = HookedVm::current(state, "vmbridge_expand_stack_limit") {
            runtime::expand_stack_limit(&mut vm, slots);
        }
    });
}

/// Returns `1` when the function at call-frame `level` runs as native code.
///
/// # Safety
/// `state` must be null or a live runtime state handle.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_is_native(state: *mut VmState, level: c_int) -> c_int {
    guard("vmbridge_is_native", 0, || {
        HookedVm::current(state, "vmbridge_is_native")
            .map(|vm| c_int::from(runtime::is_native(&vm, level)))
            .unwrap_or(0)
    })
}
