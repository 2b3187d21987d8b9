//! CSV transport for unit tables: headered CSV in, selected rows out.

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::data::{Unit, UnitTable};
use crate::errors::SamplerError;
use crate::types::{AttrValue, ColumnName};

/// Read a headered CSV file into a `UnitTable`. Blank cells become `None`;
/// rows shorter than the header leave their trailing columns `None`.
pub fn read_units_csv(path: impl AsRef<Path>) -> Result<UnitTable, SamplerError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path.as_ref())?;
    let columns: Vec<ColumnName> = reader
        .headers()?
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut units = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut fields: IndexMap<ColumnName, Option<AttrValue>> =
            IndexMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            let cell = record.get(idx).filter(|value| !value.is_empty());
            fields.insert(column.clone(), cell.map(str::to_string));
        }
        units.push(Unit::new(fields));
    }
    debug!(
        rows = units.len(),
        columns = columns.len(),
        "loaded unit table"
    );
    Ok(UnitTable::new(columns, units))
}

/// Write units to a headered CSV file using `columns` as the header order.
/// Missing cells are written as empty fields.
pub fn write_units_csv(
    path: impl AsRef<Path>,
    columns: &[ColumnName],
    units: &[Unit],
) -> Result<(), SamplerError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(columns)?;
    for unit in units {
        let row: Vec<&str> = columns
            .iter()
            .map(|column| unit.field(column).unwrap_or(""))
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
