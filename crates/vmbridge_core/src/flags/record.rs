//! Typed flag records.
//!
//! # Responsibility
//! - Define the two flag payload kinds (`bool`, `i32`) and their records.
//! - Keep record values writable through a shared borrow.
//!
//! # Invariants
//! - A record's `name` and default never change after registration.
//! - Only the scalar `value` is mutable; relaxed atomics are enough because
//!   no value is used to publish other memory.

use crate::flags::registry::FlagRegistry;
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Payload kind of one flag list.
///
/// The numeric tag is part of the C boundary contract (`0` = bool, `1` = int).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Bool,
    Int,
}

impl FlagKind {
    /// Stable numeric tag used in snapshots.
    pub fn tag(self) -> i32 {
        match self {
            Self::Bool => 0,
            Self::Int => 1,
        }
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(Self::Bool),
            1 => Some(Self::Int),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
        }
    }

    /// Parses `bool|int`, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Some(Self::Bool),
            "int" | "integer" => Some(Self::Int),
            _ => None,
        }
    }
}

impl Display for FlagKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for bool {}
    impl Sealed for i32 {}
}

/// Scalar types a flag can carry.
///
/// Sealed: the registry only knows about the boolean and integer lists.
pub trait FlagScalar: sealed::Sealed + Copy + PartialEq + Debug + Send + Sync + 'static {
    const KIND: FlagKind;

    #[doc(hidden)]
    type Cell: Send + Sync;

    #[doc(hidden)]
    fn new_cell(value: Self) -> Self::Cell;

    #[doc(hidden)]
    fn load(cell: &Self::Cell) -> Self;

    #[doc(hidden)]
    fn store(cell: &Self::Cell, value: Self);

    /// Returns this kind's list inside `registry`, in registration order.
    fn records(registry: &FlagRegistry) -> &[FlagRecord<Self>];
}

impl FlagScalar for bool {
    const KIND: FlagKind = FlagKind::Bool;
    type Cell = AtomicBool;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicBool::new(value)
    }

    fn load(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn store(cell: &Self::Cell, value: Self) {
        cell.store(value, Ordering::Relaxed);
    }

    fn records(registry: &FlagRegistry) -> &[FlagRecord<Self>] {
        registry.bool_records()
    }
}

impl FlagScalar for i32 {
    const KIND: FlagKind = FlagKind::Int;
    type Cell = AtomicI32;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicI32::new(value)
    }

    fn load(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn store(cell: &Self::Cell, value: Self) {
        cell.store(value, Ordering::Relaxed);
    }

    fn records(registry: &FlagRegistry) -> &[FlagRecord<Self>] {
        registry.int_records()
    }
}

/// One named, typed, mutable flag.
pub struct FlagRecord<T: FlagScalar> {
    name: String,
    default: T,
    value: T::Cell,
}

impl<T: FlagScalar> FlagRecord<T> {
    pub(crate) fn new(name: String, default: T) -> Self {
        Self {
            name,
            default,
            value: T::new_cell(default),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FlagKind {
        T::KIND
    }

    /// Current value.
    pub fn value(&self) -> T {
        T::load(&self.value)
    }

    /// Compiled-in value the record was registered with.
    pub fn default_value(&self) -> T {
        self.default
    }

    pub fn is_default(&self) -> bool {
        self.value() == self.default
    }

    pub(crate) fn store(&self, value: T) {
        T::store(&self.value, value);
    }
}

impl<T: FlagScalar> Debug for FlagRecord<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagRecord")
            .field("name", &self.name)
            .field("kind", &T::KIND)
            .field("value", &self.value())
            .field("default", &self.default)
            .finish()
    }
}
