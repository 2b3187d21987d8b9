//! Stratum keys: normalized, hashable composites of categorical attributes.

use std::fmt;

use crate::constants::key::{KEY_DISPLAY_SEPARATOR, UNKNOWN_VALUE};
use crate::data::Unit;
use crate::types::{ColumnName, KeyPart};

/// Canonical stratum identity: an ordered tuple of normalized attribute values.
///
/// Two units belong to the same stratum iff their keys compare equal
/// element-wise. Keys hash and order structurally, so they can serve as map
/// keys and as deterministic tie-breakers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StratumKey(Vec<KeyPart>);

impl StratumKey {
    /// Build a key from already-normalized parts.
    pub fn from_parts(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    /// The normalized components, in stratification-column order.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

impl fmt::Display for StratumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(KEY_DISPLAY_SEPARATOR))
    }
}

/// Normalize one raw attribute value into a key part.
///
/// Trims surrounding whitespace and uppercases; a missing value, or one that
/// is blank after trimming, becomes the `UNKNOWN` sentinel. Total and
/// idempotent.
pub fn normalize_value(raw: Option<&str>) -> KeyPart {
    match raw {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                UNKNOWN_VALUE.to_string()
            } else {
                trimmed.to_uppercase()
            }
        }
        None => UNKNOWN_VALUE.to_string(),
    }
}

/// Maps units to stratum keys over a fixed ordered set of columns.
#[derive(Clone, Debug)]
pub struct StratumKeyBuilder {
    columns: Vec<ColumnName>,
}

impl StratumKeyBuilder {
    /// Build a key builder over `columns`, in the given order.
    pub fn new(columns: Vec<ColumnName>) -> Self {
        Self { columns }
    }

    /// The stratification columns this builder reads, in key order.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Compute the stratum key for one unit. Never fails; absent or blank
    /// cells normalize to the sentinel.
    pub fn key_for(&self, unit: &Unit) -> StratumKey {
        StratumKey::from_parts(
            self.columns
                .iter()
                .map(|column| normalize_value(unit.field(column)))
                .collect(),
        )
    }
}
