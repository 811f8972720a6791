//! Error types for mindb.

use crate::record::Rid;
use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;
use core::fmt;

/// Result type alias for mindb operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Coarse status class of an [`Error`].
///
/// End of stream is not an error: operators report it as `Ok(false)` and
/// scanners as `Ok(None)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Internal,
    InvalidArgument,
    Unimplemented,
    RecordInvisible,
    LockedConcurrencyConflict,
    NotFound,
    TypeMismatch,
    SchemaError,
    ConstraintViolation,
}

/// Error types for mindb operations.
#[derive(Debug)]
pub enum Error {
    /// Broken internal invariant or failing storage collaborator.
    Internal {
        message: String,
    },
    /// Malformed plan or argument.
    InvalidArgument {
        message: String,
    },
    /// Recognized but unsupported construct.
    Unimplemented {
        feature: String,
    },
    /// Record is not visible to the current transaction.
    RecordInvisible {
        rid: Rid,
    },
    /// Record is locked by a concurrent transaction.
    LockedConcurrencyConflict {
        table: String,
        rid: Rid,
    },
    /// Type mismatch error.
    TypeMismatch {
        expected: DataType,
        got: DataType,
    },
    /// Record not found.
    RecordNotFound {
        table: String,
        rid: Rid,
    },
    /// Column not found.
    ColumnNotFound {
        table: String,
        column: String,
    },
    /// Table not found.
    TableNotFound {
        name: String,
    },
    /// Invalid schema definition.
    InvalidSchema {
        message: String,
    },
    /// Unique constraint violation.
    UniqueConstraint {
        index: String,
        value: Value,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Internal { message } => write!(f, "Internal error: {}", message),
            Error::InvalidArgument { message } => write!(f, "Invalid argument: {}", message),
            Error::Unimplemented { feature } => write!(f, "Not implemented: {}", feature),
            Error::RecordInvisible { rid } => write!(f, "Record {} is not visible", rid),
            Error::LockedConcurrencyConflict { table, rid } => {
                write!(f, "Record {} in table {} is locked", rid, table)
            }
            Error::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Error::RecordNotFound { table, rid } => {
                write!(f, "Record {} not found in table {}", rid, table)
            }
            Error::ColumnNotFound { table, column } => {
                if table.is_empty() {
                    write!(f, "Column not found: {}", column)
                } else {
                    write!(f, "Column {} not found in table {}", column, table)
                }
            }
            Error::TableNotFound { name } => write!(f, "Table not found: {}", name),
            Error::InvalidSchema { message } => write!(f, "Invalid schema: {}", message),
            Error::UniqueConstraint { index, value } => {
                write!(f, "Unique constraint violation on index {}: {}", index, value)
            }
        }
    }
}

impl Error {
    /// Returns the status class of this error.
    pub fn code(&self) -> StatusCode {
        match self {
            Error::Internal { .. } => StatusCode::Internal,
            Error::InvalidArgument { .. } => StatusCode::InvalidArgument,
            Error::Unimplemented { .. } => StatusCode::Unimplemented,
            Error::RecordInvisible { .. } => StatusCode::RecordInvisible,
            Error::LockedConcurrencyConflict { .. } => StatusCode::LockedConcurrencyConflict,
            Error::TypeMismatch { .. } => StatusCode::TypeMismatch,
            Error::RecordNotFound { .. }
            | Error::ColumnNotFound { .. }
            | Error::TableNotFound { .. } => StatusCode::NotFound,
            Error::InvalidSchema { .. } => StatusCode::SchemaError,
            Error::UniqueConstraint { .. } => StatusCode::ConstraintViolation,
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unimplemented error.
    pub fn unimplemented(feature: impl Into<String>) -> Self {
        Error::Unimplemented {
            feature: feature.into(),
        }
    }

    /// Creates a record invisible error.
    pub fn record_invisible(rid: Rid) -> Self {
        Error::RecordInvisible { rid }
    }

    /// Creates a lock conflict error.
    pub fn locked(table: impl Into<String>, rid: Rid) -> Self {
        Error::LockedConcurrencyConflict {
            table: table.into(),
            rid,
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch { expected, got }
    }

    /// Creates a record not found error.
    pub fn record_not_found(table: impl Into<String>, rid: Rid) -> Self {
        Error::RecordNotFound {
            table: table.into(),
            rid,
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a unique constraint error.
    pub fn unique_constraint(index: impl Into<String>, value: Value) -> Self {
        Error::UniqueConstraint {
            index: index.into(),
            value,
        }
    }
}
