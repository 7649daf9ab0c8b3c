//! Structured error types for the resolution pipeline.
//!
//! Every failure carries the offending location, keypath, or token so
//! callers can branch on [`ErrorKind`] instead of matching message text.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error kinds for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    // Loading
    SourceNotFound,
    Decode,
    Parse,

    // Keypath normalization
    InvalidPath,

    // Placeholder stage
    UnresolvedPlaceholder,

    // Reference stage
    UnresolvedReference,
    CyclicReference,
    NonScalarReference,
    ReferenceDepthExceeded,

    // View access
    KeyNotFound,
    InvalidValue,
}

/// Errors raised by loading, resolution, and view access.
#[derive(Error, Debug)]
pub enum Error {
    #[error("source not found: {location}")]
    SourceNotFound {
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {location} as UTF-8")]
    Decode { location: PathBuf },

    #[error("failed to parse {location}: {message}")]
    Parse { location: PathBuf, message: String },

    #[error("invalid keypath '{path}': no segments after normalization")]
    InvalidPath { path: String },

    #[error("unresolved placeholder ${{{name}}} at {keypath}")]
    UnresolvedPlaceholder { name: String, keypath: String },

    #[error("unresolved reference ${{ref:{target}}} at {keypath}")]
    UnresolvedReference { target: String, keypath: String },

    #[error("cyclic reference: {}", chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    #[error(
        "reference ${{ref:{target}}} at {keypath} resolves to a non-scalar \
         value but is embedded in a larger string"
    )]
    NonScalarReference { target: String, keypath: String },

    #[error("reference chain at {keypath} exceeds {max_depth} hops")]
    ReferenceDepthExceeded { keypath: String, max_depth: usize },

    #[error("key not found: {keypath}")]
    KeyNotFound { keypath: String },

    #[error("invalid value at {keypath}: expected {expected}")]
    InvalidValue { keypath: String, expected: String },
}

impl Error {
    /// The kind discriminant for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::InvalidPath { .. } => ErrorKind::InvalidPath,
            Error::UnresolvedPlaceholder { .. } => ErrorKind::UnresolvedPlaceholder,
            Error::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Error::CyclicReference { .. } => ErrorKind::CyclicReference,
            Error::NonScalarReference { .. } => ErrorKind::NonScalarReference,
            Error::ReferenceDepthExceeded { .. } => ErrorKind::ReferenceDepthExceeded,
            Error::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Error::InvalidValue { .. } => ErrorKind::InvalidValue,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Per-pipeline policy for downgrading recoverable failures.
///
/// Applies to loading and placeholder failures only. Reference-stage
/// structural failures (missing targets, cycles) always raise: they
/// indicate a corrupt configuration graph that must not silently
/// degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnError {
    /// Fail fast on the first error (default).
    #[default]
    Raise,
    /// Skip the failing source or leave the failing token verbatim.
    Ignore,
    /// Substitute an empty value and log a warning.
    Warn,
}
