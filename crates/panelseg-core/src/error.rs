//! Error types for panelseg-core
//!
//! The core exposes a single error type carrying a domain tag, an integer
//! code, and a human description. Internal algorithmic
//! impossibilities (an out-of-bounds line, an empty peak set) are data-skip
//! events handled inline, not converted into this type; only conditions at
//! an entry boundary become an `Error`.
//!
//! # See also
//!
//! The Objective-C++ original surfaces these as `NSError` with domains
//! `kCGImageErrorDomain`-alike vImage codes, POSIX `errno`, and a project
//! error domain for everything else. This module replaces the three-way
//! split with a single Rust enum so callers can match on `Kind` directly.

use thiserror::Error;

/// Which boundary produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Buffer allocation, kernel size, or ROI mismatch.
    VImage,
    /// I/O at the collaborator boundary.
    Posix,
    /// Invalid or missing parameter, or another unexpected condition.
    General,
}

/// panelseg-core error type
#[derive(Debug, Error)]
#[error("{kind:?} error {code}: {message}")]
pub struct Error {
    pub kind: Kind,
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn vimage(code: i32, message: impl Into<String>) -> Self {
        Self {
            kind: Kind::VImage,
            code,
            message: message.into(),
        }
    }

    pub fn posix(code: i32, message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Posix,
            code,
            message: message.into(),
        }
    }

    pub fn general(code: i32, message: impl Into<String>) -> Self {
        Self {
            kind: Kind::General,
            code,
            message: message.into(),
        }
    }

    /// Build the "missing required parameter" error.
    pub fn missing_param(key: &str) -> Self {
        Self::general(0, format!("missing required parameter: {key}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = err.raw_os_error().unwrap_or(0);
        Self::posix(code, err.to_string())
    }
}

/// Result type alias for panelseg operations
pub type Result<T> = std::result::Result<T, Error>;
