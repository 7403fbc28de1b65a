//! Boundary layer between an embedding host and a scripting VM runtime.
//!
//! This crate holds the semantics: the typed flag registry, the assertion
//! hook, the protected-call relay and the runtime pass-through adapter. The
//! C ABI lives in `vmbridge_ffi`.

pub mod assertion;
pub mod config;
pub mod flags;
pub mod logging;
pub mod protected;
pub mod runtime;

pub use assertion::{AssertAction, AssertionFailure, AssertionHandler};
pub use config::{BridgeConfig, ConfigError};
pub use flags::global::{global_registry, global_registry_installed, install_global_registry};
pub use flags::overrides::{
    parse_overrides, FlagOverride, FlagOverrideError, OverrideParseError, OverrideReport,
};
pub use flags::record::{FlagKind, FlagRecord, FlagScalar};
pub use flags::registry::{is_valid_flag_name, FlagRegistry, FlagRegistryBuilder, FlagRegistryError};
pub use flags::snapshot::{FlagEntry, FlagSnapshot};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use protected::{
    protected_call, CallOutcome, CallState, DirectTrampoline, ProtectedCallContext, Trampoline,
};
pub use runtime::VmInternals;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
