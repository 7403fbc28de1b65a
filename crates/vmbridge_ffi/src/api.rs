//! Process-level C exports: version, logging, configuration, assertion hook
//! and buffer release.
//!
//! # FFI contract
//! - Exported functions never unwind; failures map to documented values.
//! - Status codes: `0` success, `-1` failure, unless stated otherwise.

use crate::boundary::{c_str_arg, guard};
use crate::buffer::OwnedBuffer;
use log::{debug, info};
use std::ffi::{c_char, c_int, c_void};
use vmbridge_core::assertion::{self, AssertAction, AssertionFailure};
use vmbridge_core::{global_registry, BridgeConfig, ConfigError, FlagRegistry};

static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Library version as a static NUL-terminated string.
///
/// # FFI contract
/// - The pointer is valid for the whole process; never free it.
#[no_mangle]
pub extern "C" fn vmbridge_version() -> *const c_char {
    VERSION.as_ptr().cast::<c_char>()
}

/// Starts file logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory path.
/// - Repeating the same call is a no-op; a different level or directory
///   returns `-1`.
///
/// # Safety
/// Both arguments must be null or NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_init_logging(
    level: *const c_char,
    log_dir: *const c_char,
) -> c_int {
    guard("vmbridge_init_logging", -1, || {
        let (Some(level), Some(log_dir)) = (c_str_arg(level), c_str_arg(log_dir)) else {
            return -1;
        };
        match vmbridge_core::init_logging(level, log_dir) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("vmbridge: {err}");
                -1
            }
        }
    })
}

/// Reads `VMBRIDGE_*` variables, starts logging if configured and applies
/// flag overrides to the installed registry.
///
/// Returns the number of overrides naming unknown flags, or `-1` when the
/// environment is invalid or logging fails to start.
#[no_mangle]
pub extern "C" fn vmbridge_init_from_env() -> c_int {
    guard("vmbridge_init_from_env", -1, || {
        init_from_config(BridgeConfig::from_env(), global_registry())
    })
}

fn init_from_config(config: Result<BridgeConfig, ConfigError>, registry: &FlagRegistry) -> c_int {
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("vmbridge: {err}");
            return -1;
        }
    };
    if let Err(err) = config.init_logging() {
        eprintln!("vmbridge: {err}");
        return -1;
    }
    let report = config.apply_flag_overrides(registry);
    info!(
        "event=init_from_env module=ffi status=ok overrides_applied={} overrides_failed={}",
        report.applied,
        report.failures.len()
    );
    c_int::try_from(report.failures.len()).unwrap_or(c_int::MAX)
}

/// Installs the printing assertion handler for the runtime.
#[no_mangle]
pub extern "C" fn vmbridge_register_assertion_handler() {
    guard("vmbridge_register_assertion_handler", (), || {
        assertion::install_default_handler();
    });
}

/// Reports a failed runtime assertion.
///
/// Returns `0` to continue or `1` to abort.
///
/// # Safety
/// String arguments must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_report_assertion(
    expression: *const c_char,
    file: *const c_char,
    line: c_int,
    function: *const c_char,
) -> c_int {
    let abort = AssertAction::Abort.as_status();
    guard("vmbridge_report_assertion", abort, || {
        let failure = AssertionFailure {
            expression: c_str_arg(expression).unwrap_or("<unknown>"),
            file: c_str_arg(file).unwrap_or("<unknown>"),
            line: u32::try_from(line).unwrap_or(0),
            function: c_str_arg(function).unwrap_or("<unknown>"),
        };
        assertion::report_failure(&failure).as_status()
    })
}

/// Releases one buffer previously returned across the boundary.
///
/// # Safety
/// `ptr` must be null or a buffer from the C allocator that the caller owns.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_free(ptr: *mut c_void) {
    guard("vmbridge_free", (), || {
        if let Some(buffer) = OwnedBuffer::from_raw(ptr) {
            drop(buffer);
        } else {
            debug!("event=free module=ffi status=ignored reason=null_pointer");
        }
    });
}
