//! Error types for simple-zip

use std::io;

/// Result type for simple-zip operations
pub type Result<T> = std::result::Result<T, ZipError>;

/// Error types that can occur while building a ZIP archive
#[derive(Debug)]
pub enum ZipError {
    /// I/O error (only raised when handing a finished archive to a writer)
    Io(io::Error),
    /// Entry is missing its name or its payload, or the name is empty
    InvalidEntry(String),
    /// Payload could not be coerced into bytes
    UnsupportedPayloadType(String),
    /// A write was attempted past the buffer's reserved capacity
    CapacityExceeded { requested: usize, remaining: usize },
    /// A value does not fit the classic (non-ZIP64) header fields
    ArchiveTooLarge(String),
}

impl std::fmt::Display for ZipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZipError::Io(e) => write!(f, "I/O error: {}", e),
            ZipError::InvalidEntry(msg) => write!(f, "Invalid entry: {}", msg),
            ZipError::UnsupportedPayloadType(ty) => {
                write!(f, "Unsupported payload type: {}", ty)
            }
            ZipError::CapacityExceeded {
                requested,
                remaining,
            } => write!(
                f,
                "Buffer capacity exceeded: {} bytes requested, {} remaining",
                requested, remaining
            ),
            ZipError::ArchiveTooLarge(msg) => write!(f, "Archive too large: {}", msg),
        }
    }
}

impl std::error::Error for ZipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZipError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ZipError {
    fn from(err: io::Error) -> Self {
        ZipError::Io(err)
    }
}
