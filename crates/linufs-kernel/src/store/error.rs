//! Node store error types.

use std::io;
use thiserror::Error;

use crate::wire::WireError;

/// Node store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Named entry or identifier not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A sibling with the same name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a regular file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Directory still has children.
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    /// Name is empty or contains `/` or NUL.
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// Name does not fit the fixed wire field.
    #[error("file name too long")]
    NameTooLong,

    /// Every identifier in the arena is bound.
    #[error("identifier space exhausted")]
    Exhausted,

    /// Admin service answered with a non-zero status.
    #[error("admin {method} failed with status {code}")]
    Rpc { method: &'static str, code: i64 },

    /// The RPC channel itself failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The RPC round trip did not complete in time.
    #[error("admin {0} timed out")]
    Timeout(&'static str),

    /// Reply did not match the packed record layout.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Backend configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Create a NotFound error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists(what.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(what: impl Into<String>) -> Self {
        Self::NotADirectory(what.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(what: impl Into<String>) -> Self {
        Self::IsADirectory(what.into())
    }

    /// Create a DirectoryNotEmpty error.
    pub fn directory_not_empty(what: impl Into<String>) -> Self {
        Self::DirectoryNotEmpty(what.into())
    }

    /// Create a Transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// The adapter-facing status this error collapses to.
    pub fn status(&self) -> Status {
        Status::from(self)
    }
}

/// Status triplet returned across the adapter boundary.
///
/// Discriminants are part of the adapter contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    Unknown = 1,
    NotFound = 2,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl From<&StoreError> for Status {
    fn from(e: &StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Status::NotFound,
            _ => Status::Unknown,
        }
    }
}

impl<T> From<&StoreResult<T>> for Status {
    fn from(r: &StoreResult<T>) -> Self {
        match r {
            Ok(_) => Status::Ok,
            Err(e) => Status::from(e),
        }
    }
}

/// Convert StoreError to std::io::Error for compatibility.
impl From<StoreError> for io::Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            StoreError::AlreadyExists(msg) => io::Error::new(io::ErrorKind::AlreadyExists, msg),
            StoreError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            StoreError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            StoreError::DirectoryNotEmpty(msg) => {
                io::Error::new(io::ErrorKind::DirectoryNotEmpty, msg)
            }
            StoreError::InvalidName(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            StoreError::NameTooLong => {
                io::Error::new(io::ErrorKind::InvalidInput, "file name too long")
            }
            StoreError::Exhausted => {
                io::Error::new(io::ErrorKind::StorageFull, "identifier space exhausted")
            }
            StoreError::Timeout(method) => {
                io::Error::new(io::ErrorKind::TimedOut, format!("admin {method} timed out"))
            }
            StoreError::Io(e) => e,
            other => io::Error::other(other.to_string()),
        }
    }
}

/// Node store result type.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StoreError::not_found("x").status(), Status::NotFound);
        assert_eq!(StoreError::already_exists("x").status(), Status::Unknown);
        assert_eq!(
            StoreError::Rpc { method: "remove", code: 1 }.status(),
            Status::Unknown
        );
        assert_eq!(StoreError::Timeout("list").status(), Status::Unknown);

        let ok: StoreResult<()> = Ok(());
        assert_eq!(Status::from(&ok), Status::Ok);
        assert_eq!(Status::Ok as i32, 0);
        assert_eq!(Status::Unknown as i32, 1);
        assert_eq!(Status::NotFound as i32, 2);
    }

    #[test]
    fn test_io_conversion() {
        let err: io::Error = StoreError::not_found("a").into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err: io::Error = StoreError::Timeout("read").into();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
