//! Flag registry and name-indexed access.
//!
//! # Responsibility
//! - Own the boolean and integer flag lists for one runtime.
//! - Provide lookup-by-name, set-by-name and enumeration.
//!
//! # Invariants
//! - Lists are append-only during build and frozen afterwards.
//! - Names are unique within one kind; bool and int lists are independent
//!   namespaces and may share a name.
//! - Lookups scan in registration order and stop at the first match.
//! - An unknown name is a normal outcome (`false` / `None`), never an error.

use crate::flags::overrides::{FlagOverride, FlagOverrideError, OverrideReport};
use crate::flags::record::{FlagKind, FlagRecord, FlagScalar};
use crate::flags::snapshot::{FlagEntry, FlagSnapshot};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static FLAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid flag name regex"));

/// Prefix of diagnostic flags skipped by bulk boolean updates.
const DEBUG_FLAG_PREFIX: &str = "Debug";

/// Returns whether `name` is a legal flag name.
pub fn is_valid_flag_name(name: &str) -> bool {
    FLAG_NAME_RE.is_match(name)
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagRegistryError {
    InvalidName(String),
    DuplicateFlag { kind: FlagKind, name: String },
    AlreadyInstalled,
}

impl Display for FlagRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "flag name is invalid: `{value}`"),
            Self::DuplicateFlag { kind, name } => {
                write!(f, "{kind} flag already registered: {name}")
            }
            Self::AlreadyInstalled => write!(f, "global flag registry is already installed"),
        }
    }
}

impl Error for FlagRegistryError {}

/// Collects flag declarations during runtime initialization.
#[derive(Debug, Default)]
pub struct FlagRegistryBuilder {
    bools: Vec<FlagRecord<bool>>,
    ints: Vec<FlagRecord<i32>>,
}

impl FlagRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one boolean flag with its compiled-in default.
    pub fn register_bool(&mut self, name: &str, default: bool) -> Result<(), FlagRegistryError> {
        let name = validate_new_name(&self.bools, name)?;
        self.bools.push(FlagRecord::new(name, default));
        Ok(())
    }

    /// Registers one integer flag with its compiled-in default.
    pub fn register_int(&mut self, name: &str, default: i32) -> Result<(), FlagRegistryError> {
        let name = validate_new_name(&self.ints, name)?;
        self.ints.push(FlagRecord::new(name, default));
        Ok(())
    }

    /// Chaining form of [`register_bool`](Self::register_bool).
    pub fn with_bool(mut self, name: &str, default: bool) -> Result<Self, FlagRegistryError> {
        self.register_bool(name, default)?;
        Ok(self)
    }

    /// Chaining form of [`register_int`](Self::register_int).
    pub fn with_int(mut self, name: &str, default: i32) -> Result<Self, FlagRegistryError> {
        self.register_int(name, default)?;
        Ok(self)
    }

    /// Freezes the lists.
    pub fn build(self) -> FlagRegistry {
        debug!(
            "event=flag_registry_build module=flags status=ok bool_count={} int_count={}",
            self.bools.len(),
            self.ints.len()
        );
        FlagRegistry {
            bools: self.bools,
            ints: self.ints,
        }
    }
}

fn validate_new_name<T: FlagScalar>(
    existing: &[FlagRecord<T>],
    name: &str,
) -> Result<String, FlagRegistryError> {
    if !is_valid_flag_name(name) {
        return Err(FlagRegistryError::InvalidName(name.to_string()));
    }
    if existing.iter().any(|record| record.name() == name) {
        return Err(FlagRegistryError::DuplicateFlag {
            kind: T::KIND,
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Frozen per-kind flag lists of one runtime.
#[derive(Debug, Default)]
pub struct FlagRegistry {
    bools: Vec<FlagRecord<bool>>,
    ints: Vec<FlagRecord<i32>>,
}

impl FlagRegistry {
    pub fn builder() -> FlagRegistryBuilder {
        FlagRegistryBuilder::new()
    }

    /// Registry with no flags.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn bool_records(&self) -> &[FlagRecord<bool>] {
        &self.bools
    }

    pub(crate) fn int_records(&self) -> &[FlagRecord<i32>] {
        &self.ints
    }

    /// Returns records of kind `T` in registration order.
    pub fn records<T: FlagScalar>(&self) -> &[FlagRecord<T>] {
        T::records(self)
    }

    pub fn len(&self) -> usize {
        self.bools.len() + self.ints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bools.is_empty() && self.ints.is_empty()
    }

    pub fn count(&self, kind: FlagKind) -> usize {
        match kind {
            FlagKind::Bool => self.bools.len(),
            FlagKind::Int => self.ints.len(),
        }
    }

    /// First record of kind `T` named exactly `name`.
    pub fn find<T: FlagScalar>(&self, name: &str) -> Option<&FlagRecord<T>> {
        T::records(self).iter().find(|record| record.name() == name)
    }

    /// Overwrites the value of flag `name`; returns `false` when unknown.
    pub fn set<T: FlagScalar>(&self, name: &str, value: T) -> bool {
        match self.find::<T>(name) {
            Some(record) => {
                record.store(value);
                debug!(
                    "event=flag_set module=flags status=ok kind={} name={} value={:?}",
                    T::KIND,
                    name,
                    value
                );
                true
            }
            None => {
                debug!(
                    "event=flag_set module=flags status=not_found kind={} name_len={}",
                    T::KIND,
                    name.len()
                );
                false
            }
        }
    }

    /// Reads the value of flag `name`; `None` when unknown.
    pub fn get<T: FlagScalar>(&self, name: &str) -> Option<T> {
        self.find::<T>(name).map(FlagRecord::value)
    }

    pub fn set_bool(&self, name: &str, value: bool) -> bool {
        self.set(name, value)
    }

    pub fn set_int(&self, name: &str, value: i32) -> bool {
        self.set(name, value)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name)
    }

    /// Copies every name with its kind: booleans first, then integers.
    pub fn snapshot(&self) -> FlagSnapshot {
        let entries = self
            .bools
            .iter()
            .map(|record| FlagEntry::new(record.name(), FlagKind::Bool))
            .chain(
                self.ints
                    .iter()
                    .map(|record| FlagEntry::new(record.name(), FlagKind::Int)),
            )
            .collect::<Vec<_>>();
        FlagSnapshot::from_entries(entries)
    }

    /// Sets every boolean flag not prefixed with `Debug`.
    ///
    /// Returns the number of flags written.
    pub fn set_all_bools(&self, value: bool) -> usize {
        let mut written = 0;
        for record in self
            .bools
            .iter()
            .filter(|record| !record.name().starts_with(DEBUG_FLAG_PREFIX))
        {
            record.store(value);
            written += 1;
        }
        debug!(
            "event=flag_set_all module=flags status=ok value={} written={}",
            value, written
        );
        written
    }

    /// Restores every flag to its compiled-in default.
    pub fn reset_to_defaults(&self) {
        for record in &self.bools {
            record.store(record.default_value());
        }
        for record in &self.ints {
            record.store(record.default_value());
        }
    }

    /// Applies overrides in order; unknown names are collected, not fatal.
    pub fn apply_overrides(&self, overrides: &[FlagOverride]) -> OverrideReport {
        let mut report = OverrideReport::default();
        for item in overrides {
            let applied = match item {
                FlagOverride::Bool { name, value } => self.set_bool(name, *value),
                FlagOverride::Int { name, value } => self.set_int(name, *value),
                FlagOverride::AllBools(value) => {
                    self.set_all_bools(*value);
                    true
                }
            };
            if applied {
                report.applied += 1;
            } else if let Some(name) = item.name() {
                report.failures.push(FlagOverrideError::UnknownFlag {
                    kind: item.kind(),
                    name: name.to_string(),
                });
            }
        }
        report
    }
}
