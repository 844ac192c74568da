//! Domain-specific errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("duplicate row id '{0}'")]
    DuplicateRowId(String),
    #[error("id column '{0}' not found in headers")]
    UnknownIdColumn(String),
    #[error("record {row} has {got} fields, expected {expected}")]
    RaggedRecord {
        row: usize,
        got: usize,
        expected: usize,
    },
}
