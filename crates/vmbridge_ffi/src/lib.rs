//! C ABI for the vmbridge boundary layer.
//!
//! # Responsibility
//! - Export the flag registry, assertion hook, buffer release and runtime
//!   pass-throughs as `extern "C"` functions.
//! - On wasm, export the try/catch entry points the host trampoline calls.
//!
//! # Invariants
//! - No export unwinds into the host.
//! - Every buffer handed out has exactly one release function.

mod boundary;

pub mod api;
pub mod buffer;
pub mod flags;
pub mod runtime;
pub mod trycatch;

pub use api::{
    vmbridge_free, vmbridge_init_from_env, vmbridge_init_logging,
    vmbridge_register_assertion_handler, vmbridge_report_assertion, vmbridge_version,
};
pub use flags::{
    vmbridge_apply_flag_overrides, vmbridge_flags_json, vmbridge_get_flag_bool,
    vmbridge_get_flag_int, vmbridge_get_flags, vmbridge_release_flags, vmbridge_set_flag_bool,
    vmbridge_set_flag_int, FlagGroup,
};
pub use runtime::{
    vmbridge_check_stack, vmbridge_expand_stack_limit, vmbridge_install_runtime_hooks,
    vmbridge_is_native, RuntimeHooks, VmState,
};
pub use trycatch::{HostBoundary, HostTrampoline, VmException};
