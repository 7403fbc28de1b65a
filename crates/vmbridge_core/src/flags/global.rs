//! Process-wide registry slot.
//!
//! # Invariants
//! - The slot is written at most once, during runtime initialization.
//! - Callers borrow the registry per call and never hold records across
//!   calls.
//! - Before installation, lookups see an empty registry.

use crate::flags::registry::{FlagRegistry, FlagRegistryError};
use log::info;
use once_cell::sync::{Lazy, OnceCell};

static GLOBAL_REGISTRY: OnceCell<FlagRegistry> = OnceCell::new();
static EMPTY_REGISTRY: Lazy<FlagRegistry> = Lazy::new(FlagRegistry::empty);

/// Installs the runtime's registry for the rest of the process.
///
/// # Errors
/// - Returns `AlreadyInstalled` when a registry was installed before.
pub fn install_global_registry(
    registry: FlagRegistry,
) -> Result<&'static FlagRegistry, FlagRegistryError> {
    let bool_count = registry.count(crate::FlagKind::Bool);
    let int_count = registry.count(crate::FlagKind::Int);
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| FlagRegistryError::AlreadyInstalled)?;
    info!(
        "event=flag_registry_install module=flags status=ok bool_count={} int_count={}",
        bool_count, int_count
    );
    Ok(global_registry())
}

/// Returns the installed registry, or an empty one before installation.
pub fn global_registry() -> &'static FlagRegistry {
    GLOBAL_REGISTRY.get().unwrap_or_else(|| &*EMPTY_REGISTRY)
}

pub fn global_registry_installed() -> bool {
    GLOBAL_REGISTRY.get().is_some()
}
