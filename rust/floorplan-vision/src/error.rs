// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for floor plan analysis.
//!
//! Only malformed input is an error. A valid drawing that yields no walls is a
//! successful, empty [`FloorPlanAnalysis`](crate::types::FloorPlanAnalysis);
//! degenerate geometry and open traces are filtered silently inside the stages.

/// Result type alias for floor plan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while analyzing a floor plan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image has a zero dimension.
    #[error("image has no pixels: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// A raw pixel buffer does not match the declared dimensions.
    #[error("pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// A configuration value is outside its valid range.
    #[error("invalid configuration `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
