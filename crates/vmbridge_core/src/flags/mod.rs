//! Typed flag registry bridge.
//!
//! # Responsibility
//! - Hold the runtime's boolean and integer flags behind one registry.
//! - Provide name-indexed get/set and owned snapshots without exposing
//!   record storage to callers.
//!
//! # Invariants
//! - The registry is never restructured after build; only values change.
//! - "Not found" is a reportable outcome, not an error.

pub mod global;
pub mod overrides;
pub mod record;
pub mod registry;
pub mod snapshot;
