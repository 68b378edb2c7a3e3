use thiserror::Error;

/// Errors raised while applying change descriptors to a tracked model.
///
/// Diffing itself never fails - comparison is total over its inputs. These
/// errors surface drift between the tracked model and the descriptors being
/// applied, and abort the apply pass immediately; partial-apply rollback is
/// the responsibility of the outer transactional step.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("table {table} has no column named {column}")]
    ColumnNotFound { table: String, column: String },

    #[error("schema has no table named {table}")]
    TableNotFound { table: String },

    #[error("table {table} already exists")]
    TableExists { table: String },

    #[error("{change} cannot be applied to table {table}")]
    UnsupportedChange { table: String, change: &'static str },
}
