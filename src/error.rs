use std::{collections::TryReserveError, fmt::Display};

use bincode::ErrorKind;

/// Custom Result type for dbm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for dbm
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed statement: missing keyword, paren or operand
    Parse(String),
    /// Unknown table/column, duplicate table, unknown type, limits exceeded
    Schema(String),
    /// Snapshot read/write failure
    Io(String),
    /// Corrupt or foreign snapshot on open
    Load(LoadError),
    /// Allocation failure and other internal errors
    Internal(String),
}

/// Reasons a snapshot could not be loaded
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Header magic does not match
    BadMagic { found: u32 },
    /// An expected field could not be read
    Truncated,
    /// A field was read but holds an impossible value
    Corrupt(String),
    /// Filesystem error while reading
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(value: tempfile::PersistError) -> Self {
        Error::Io(value.error.to_string())
    }
}

impl From<Box<ErrorKind>> for Error {
    fn from(value: Box<ErrorKind>) -> Self {
        match *value {
            ErrorKind::Io(err) => Error::Io(err.to_string()),
            err => Error::Internal(err.to_string()),
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(value: TryReserveError) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<LoadError> for Error {
    fn from(value: LoadError) -> Self {
        Error::Load(value)
    }
}

impl std::error::Error for Error {}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::BadMagic { found } => write!(f, "bad magic {:#010x}", found),
            LoadError::Truncated => write!(f, "snapshot truncated"),
            LoadError::Corrupt(err) => write!(f, "snapshot corrupt: {}", err),
            LoadError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "parse error: {}", err),
            Error::Schema(err) => write!(f, "schema error: {}", err),
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Load(err) => write!(f, "load error: {}", err),
            Error::Internal(err) => write!(f, "internal error: {}", err),
        }
    }
}
