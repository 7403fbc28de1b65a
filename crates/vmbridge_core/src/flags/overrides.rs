//! Textual flag override lists.
//!
//! Grammar: items separated by `,`; each item is `Name=true|false`,
//! `Name=<i32>`, a bare `Name` (boolean `true`), or a bare `true`/`false`
//! that updates every non-`Debug` boolean flag.

use crate::flags::record::FlagKind;
use crate::flags::registry::is_valid_flag_name;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One parsed override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagOverride {
    Bool { name: String, value: bool },
    Int { name: String, value: i32 },
    AllBools(bool),
}

impl FlagOverride {
    /// Target flag name; `None` for bulk boolean updates.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Bool { name, .. } | Self::Int { name, .. } => Some(name.as_str()),
            Self::AllBools(_) => None,
        }
    }

    pub fn kind(&self) -> FlagKind {
        match self {
            Self::Bool { .. } | Self::AllBools(_) => FlagKind::Bool,
            Self::Int { .. } => FlagKind::Int,
        }
    }
}

/// Override list parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideParseError {
    InvalidName(String),
    InvalidValue { name: String, value: String },
}

impl Display for OverrideParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "override flag name is invalid: `{value}`"),
            Self::InvalidValue { name, value } => {
                write!(f, "override value for `{name}` is neither bool nor int: `{value}`")
            }
        }
    }
}

impl Error for OverrideParseError {}

/// Per-item failure while applying overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagOverrideError {
    UnknownFlag { kind: FlagKind, name: String },
}

impl Display for FlagOverrideError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFlag { kind, name } => write!(f, "unknown {kind} flag: {name}"),
        }
    }
}

impl Error for FlagOverrideError {}

/// Result of applying one override list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideReport {
    pub applied: usize,
    pub failures: Vec<FlagOverrideError>,
}

impl OverrideReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parses a comma-separated override list.
///
/// Empty items are skipped, so `""` parses to an empty list.
pub fn parse_overrides(list: &str) -> Result<Vec<FlagOverride>, OverrideParseError> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_override)
        .collect()
}

fn parse_override(item: &str) -> Result<FlagOverride, OverrideParseError> {
    let (name, value) = match item.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (item, None),
    };

    match (name, value) {
        ("true", None) => return Ok(FlagOverride::AllBools(true)),
        ("false", None) => return Ok(FlagOverride::AllBools(false)),
        _ => {}
    }

    if !is_valid_flag_name(name) {
        return Err(OverrideParseError::InvalidName(name.to_string()));
    }
    let name = name.to_string();

    match value {
        None | Some("true") => Ok(FlagOverride::Bool { name, value: true }),
        Some("false") => Ok(FlagOverride::Bool { name, value: false }),
        Some(raw) => match raw.parse::<i32>() {
            Ok(value) => Ok(FlagOverride::Int { name, value }),
            Err(_) => Err(OverrideParseError::InvalidValue {
                name,
                value: raw.to_string(),
            }),
        },
    }
}
