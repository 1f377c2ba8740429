//! # Error Types
//!
//! This module defines all error types used throughout the library.
//!
//! ## Error Hierarchy
//!
//! The main [`Error`] enum covers all possible failure modes:
//!
//! | Variant | Cause | Recoverable? |
//! |---------|-------|--------------|
//! | [`Error::Conversion`] | Value outside the codec's domain | No (fix the value or the codec) |
//! | [`Error::Transport`] | Fetch/write failed in the protocol client | Maybe (retry at the application level) |
//! | [`Error::Timeout`] | Deadline elapsed before ack / target value | Yes (retry with a longer deadline) |
//! | [`Error::Interrupted`] | Wait aborted by teardown | No (the binding is gone) |
//! | [`Error::AlreadyDestroyed`] | Operation on a destroyed binding | No (programming error) |
//!
//! ## Usage Pattern
//!
//! ```no_run
//! use pvbind::prelude::*;
//! use std::time::Duration;
//!
//! # async fn put_with_error_handling<V, C>(binding: &pvbind::Binding<V, C>) -> Result<()>
//! # where
//! #     V: pvbind::ProcessVariable,
//! #     C: pvbind::Codec<Raw = V::Raw, Value = f64>,
//! # {
//! match binding.put_timeout(&1.5, Duration::from_millis(500)).await {
//!     Ok(()) => { /* acknowledged */ }
//!     Err(Error::Timeout) => {
//!         // Server did not acknowledge in time; the write may still land later.
//!     }
//!     Err(Error::Transport(e)) => {
//!         // Connection lost or write rejected. Retry policy is up to the caller.
//!         eprintln!("write failed: {e}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io;

/// Result type alias using the library's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for all library operations.
///
/// This enum covers all possible failure modes. Use pattern matching
/// to handle specific error cases.
#[derive(Debug)]
pub enum Error {
    /// A value could not be converted under the active codec.
    ///
    /// Raised when a raw value cannot be decoded (wrong element count,
    /// non-decodable bytes) or an application value cannot be encoded
    /// (over-capacity string, non-invertible scaling). Never coerced
    /// silently.
    Conversion(ConversionError),

    /// The underlying protocol client failed a fetch or write.
    ///
    /// Propagated unchanged from the handle. This layer performs no
    /// retries; retry policy belongs to the protocol client or the
    /// application.
    Transport(TransportError),

    /// A deadline elapsed before the expected condition.
    ///
    /// Raised by `put_timeout` when the write acknowledgment does not
    /// arrive in time, and by `wait_for_value` when the target value is
    /// not reached in time. The underlying operation may still complete
    /// later; its late result is discarded.
    Timeout,

    /// A suspended wait was aborted by teardown.
    ///
    /// The binding was destroyed, or its event source closed, while a
    /// caller was waiting. Distinct from [`Error::Timeout`]: the deadline
    /// had not elapsed.
    Interrupted,

    /// The binding was used after `destroy()`.
    ///
    /// Any get/put/wait/subscribe operation on a destroyed binding fails
    /// with this error. This is a programming error in the caller.
    AlreadyDestroyed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversion(e) => write!(f, "Conversion error: {}", e.message),
            Self::Transport(e) => write!(f, "Transport error: {}", e.message),
            Self::Timeout => write!(f, "Operation timed out"),
            Self::Interrupted => write!(f, "Wait interrupted by teardown"),
            Self::AlreadyDestroyed => write!(f, "Binding has been destroyed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conversion(e) => Some(e),
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConversionError> for Error {
    fn from(e: ConversionError) -> Self {
        Self::Conversion(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

/// A value was outside the codec's legal domain.
#[derive(Debug)]
pub struct ConversionError {
    pub message: String,
}

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConversionError {}

/// A fetch or write failed in the underlying protocol client.
#[derive(Debug)]
pub struct TransportError {
    pub message: String,
    source: Option<io::Error>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as _)
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        Self {
            message: e.to_string(),
            source: Some(e),
        }
    }
}
