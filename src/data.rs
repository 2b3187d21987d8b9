use indexmap::IndexMap;

pub use crate::types::{AttrValue, ColumnName, UnitId};

/// One row of the population.
///
/// Cells are kept in column order; a missing or blank input cell is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    /// Cell values keyed by column name.
    pub fields: IndexMap<ColumnName, Option<AttrValue>>,
}

impl Unit {
    /// Build a unit from (column, value) pairs.
    pub fn new(fields: IndexMap<ColumnName, Option<AttrValue>>) -> Self {
        Self { fields }
    }

    /// Look up a cell, flattening the missing-column and missing-value cases.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(|value| value.as_deref())
    }
}

/// A population table: the column header plus one `Unit` per row.
///
/// Column validation (recognized id/stratification columns) runs against
/// `columns`, not against individual rows.
#[derive(Clone, Debug, Default)]
pub struct UnitTable {
    /// Recognized column names, in input order.
    pub columns: Vec<ColumnName>,
    /// Population rows.
    pub units: Vec<Unit>,
}

impl UnitTable {
    /// Build a table from a header and rows.
    pub fn new(columns: Vec<ColumnName>, units: Vec<Unit>) -> Self {
        Self { columns, units }
    }

    /// Whether `column` is part of the table header.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
