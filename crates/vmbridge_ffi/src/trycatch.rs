//! Protected calls routed through a host-side try/catch.
//!
//! On wasm the module cannot catch a raise itself, so the host performs the
//! catch. The module imports `try_catch(ctx)` and `throw(err)` from the host
//! and exports two entry points for the host to call back:
//!
//! - `vmbridge_try_impl(ctx)`: runs the protected operation; a raised error
//!   is parked inside `ctx` and passed to `throw`, which does not return.
//! - `vmbridge_catch_impl(ctx, err)`: runs the handler with the caught error.
//!
//! Host side, in pseudo-code:
//!
//! ```text
//! try_catch(ctx) { try { vmbridge_try_impl(ctx) } catch (e) { vmbridge_catch_impl(ctx, e) } }
//! throw(err)     { throw err }
//! ```

use std::fmt::{Display, Formatter};
use vmbridge_core::{protected_call, CallOutcome, ProtectedCallContext, Trampoline};

/// Error value carried across the host throw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmException {
    pub status: i32,
    pub message: String,
}

impl VmException {
    pub fn new(status: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl Display for VmException {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "vm exception (status {}): {}", self.status, self.message)
    }
}

impl std::error::Error for VmException {}

/// Context layout seen by the host: an opaque pointer.
pub type BoundaryContext = ProtectedCallContext<'static, VmException>;

/// Host primitives a boundary-limited target imports.
pub trait HostBoundary {
    /// Calls `vmbridge_try_impl(context)` inside a host try block and, if it
    /// throws, `vmbridge_catch_impl(context, error)`.
    fn try_catch(&self, context: *mut BoundaryContext);

    /// Throws `error` on the host side. A real host never returns here; if it
    /// does, the parked error is delivered to the handler directly.
    fn throw(&self, error: *const VmException);
}

/// [`Trampoline`] backed by host imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostTrampoline<H> {
    host: H,
}

impl<H: HostBoundary> HostTrampoline<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }
}

impl<H: HostBoundary> Trampoline<VmException> for HostTrampoline<H> {
    fn try_catch(&self, context: &mut ProtectedCallContext<'_, VmException>) {
        let context: *mut ProtectedCallContext<'_, VmException> = context;
        self.host.try_catch(context.cast::<BoundaryContext>());
    }
}

/// Body of `vmbridge_try_impl`.
pub fn enter_protected<H: HostBoundary + ?Sized>(host: &H, context: &mut BoundaryContext) {
    if let Some(Err(error)) = context.run_protected() {
        // Park first: no owned value may live in this frame across `throw`.
        let error: *const VmException = context.park_error(error);
        host.throw(error);
        // Reached only when the host's throw returned.
        context.run_parked_handler();
    }
}

/// Body of `vmbridge_catch_impl`.
///
/// Prefers the parked error; a foreign `error` pointer is copied. Returns
/// whether the handler ran.
///
/// # Safety
/// `error` must be null or point to a live `VmException`.
pub unsafe fn deliver_caught(context: &mut BoundaryContext, error: *const VmException) -> bool {
    if let Some(parked) = context.take_parked_error() {
        return context.run_handler(parked);
    }
    match error.as_ref() {
        Some(error) => context.run_handler(error.clone()),
        None => false,
    }
}

/// Runs `protected` through `host`, delivering a raise to `handler`.
pub fn host_protected_call<'a, H: HostBoundary>(
    host: H,
    protected: impl FnOnce() -> Result<(), VmException> + 'a,
    handler: impl FnOnce(VmException) + 'a,
) -> CallOutcome {
    protected_call(&HostTrampoline::new(host), protected, handler)
}

#[cfg(target_family = "wasm")]
pub use wasm::{vmbridge_catch_impl, vmbridge_try_impl, wasm_protected_call, WasmHost};

#[cfg(target_family = "wasm")]
mod wasm {
    use super::{deliver_caught, enter_protected, host_protected_call, BoundaryContext};
    use super::{HostBoundary, VmException};
    use vmbridge_core::CallOutcome;

    #[allow(improper_ctypes)]
    #[link(wasm_import_module = "env")]
    extern "C-unwind" {
        #[link_name = "try_catch"]
        fn host_try_catch(context: *mut BoundaryContext);
        #[link_name = "throw"]
        fn host_throw(error: *const VmException);
    }

    /// Host reached through the `env` wasm imports.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WasmHost;

    impl HostBoundary for WasmHost {
        fn try_catch(&self, context: *mut BoundaryContext) {
            unsafe { host_try_catch(context) }
        }

        fn throw(&self, error: *const VmException) {
            unsafe { host_throw(error) }
        }
    }

    /// Protected call through the wasm host trampoline.
    pub fn wasm_protected_call<'a>(
        protected: impl FnOnce() -> Result<(), VmException> + 'a,
        handler: impl FnOnce(VmException) + 'a,
    ) -> CallOutcome {
        host_protected_call(WasmHost, protected, handler)
    }

    /// Leaves through the host `throw` when the protected operation raises.
    ///
    /// # Safety
    /// `context` must be the pointer the host received from `try_catch`.
    #[no_mangle]
    #[allow(improper_ctypes_definitions)]
    pub unsafe extern "C-unwind" fn vmbridge_try_impl(context: *mut BoundaryContext) {
        if let Some(context) = context.as_mut() {
            enter_protected(&WasmHost, context);
        }
    }

    /// # Safety
    /// `context` must be the pointer the host received from `try_catch`;
    /// `error` must be null or the pointer passed to the host's `throw`.
    #[no_mangle]
    #[allow(improper_ctypes_definitions)]
    pub unsafe extern "C" fn vmbridge_catch_impl(
        context: *mut BoundaryContext,
        error: *const VmException,
    ) {
        if let Some(context) = context.as_mut() {
            deliver_caught(context, error);
        }
    }
}
