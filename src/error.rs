//! Error types for the telemetry relay
//!
//! The taxonomy mirrors the protocol boundaries: `CodecError` for anything
//! that makes a frame undecodable or unencodable, `IngestError` for rejected
//! or inconsistent submissions, and an umbrella `Error` for everything else.

use crate::store::DeviceId;

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// I/O error (socket, bind)
    Io(std::io::Error),
    /// Malformed frame during encode or decode
    Codec(CodecError),
    /// Ingest-side failure
    Ingest(IngestError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Codec(e) => write!(f, "Codec error: {}", e),
            Error::Ingest(e) => write!(f, "Ingest error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Codec(e) => Some(e),
            Error::Ingest(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}

impl From<IngestError> for Error {
    fn from(e: IngestError) -> Self {
        Error::Ingest(e)
    }
}

/// Error type for wire codec operations
///
/// Any of these on the decode side means the frame is malformed and the
/// connection that produced it should be considered desynchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer ended before the declared payload was complete
    UnexpectedEof,
    /// Unrecognized message type tag
    UnknownMessageType(u8),
    /// Unrecognized measurement kind tag
    UnknownKind(u8),
    /// Device name is not valid UTF-8
    InvalidUtf8,
    /// Device name exceeds the u16 length prefix (65535 bytes)
    NameTooLong(usize),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::UnexpectedEof => write!(f, "Unexpected end of frame"),
            CodecError::UnknownMessageType(tag) => {
                write!(f, "Unknown message type tag: {}", tag)
            }
            CodecError::UnknownKind(tag) => {
                write!(f, "Unknown measurement kind tag: {}", tag)
            }
            CodecError::InvalidUtf8 => write!(f, "Device name is not valid UTF-8"),
            CodecError::NameTooLong(len) => {
                write!(f, "Device name too long for frame: {} bytes", len)
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Error type for ingest operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// Submission rejected: device name shorter than 2 characters or longer
    /// than the wire format allows, or no measurement values given
    InvalidInput,
    /// Measurement references a device that does not exist
    ///
    /// Unreachable through the coordinator, which always creates the device
    /// first; hitting it means internal state is inconsistent.
    UnknownDevice(DeviceId),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::InvalidInput => write!(f, "Invalid ingest input"),
            IngestError::UnknownDevice(id) => write!(f, "Unknown device: {}", id),
        }
    }
}

impl std::error::Error for IngestError {}
