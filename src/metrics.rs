use std::collections::HashMap;

use crate::data::Unit;
use crate::key::normalize_value;
use crate::types::{ColumnName, KeyPart};

/// Distribution of one column's values across a selection.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnBreakdown {
    pub column: ColumnName,
    pub total: usize,
    pub values: Vec<ValueShare>,
}

/// Per-value count and share within a column breakdown.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueShare {
    pub value: KeyPart,
    pub count: usize,
    pub share: f64,
}

/// Count normalized values of `column` across `units`, sorted value-ascending.
/// Returns `None` for an empty selection.
pub fn column_breakdown(units: &[Unit], column: &str) -> Option<ColumnBreakdown> {
    if units.is_empty() {
        return None;
    }
    let mut counts: HashMap<KeyPart, usize> = HashMap::new();
    for unit in units {
        let value = normalize_value(unit.field(column));
        *counts.entry(value).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();
    let mut values: Vec<ValueShare> = counts
        .into_iter()
        .map(|(value, count)| ValueShare {
            value,
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    values.sort_by(|a, b| a.value.cmp(&b.value));
    Some(ColumnBreakdown {
        column: column.to_string(),
        total,
        values,
    })
}
