use std::io;

use thiserror::Error;

use crate::types::ColumnName;

/// Error type for sampler configuration and table I/O failures.
///
/// Degenerate inputs (zero units, `target_n == 0`, under-populated strata) are
/// not errors; they produce empty or partial selections deterministically.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("missing required id column '{0}'")]
    MissingIdColumn(ColumnName),
    #[error("missing stratification columns: {0:?}")]
    MissingStratColumns(Vec<ColumnName>),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
