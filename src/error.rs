//! Error types for layout generation.
//!
//! Every variant aborts the run that raised it. Generation is deterministic
//! for a given seed, so nothing here is retried.

use std::io;

use thiserror::Error;

/// The error type for grammar construction and layout generation.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A rectangle with a non-positive or too-small dimension was requested.
    #[error("invalid geometry: {reason} (x={x}, y={y}, width={width}, height={height})")]
    InvalidGeometry {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        reason: String,
    },

    /// A region kind has no entry in the rule table.
    #[error("no rule registered for region kind `{kind}`")]
    UnknownType { kind: &'static str },

    /// A finite random source was asked for more values than it holds.
    #[error("random source exhausted after {consumed} values")]
    RandomSourceExhausted { consumed: usize },

    /// A rule was rejected when the table was built, or cannot be applied.
    #[error("invalid rule for `{kind}`: {reason}")]
    InvalidRule { kind: &'static str, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GrammarError {
    pub(crate) fn geometry(x: f64, y: f64, width: f64, height: f64, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            x,
            y,
            width,
            height,
            reason: reason.into(),
        }
    }

    pub(crate) fn rule(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            kind,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrammarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_message_names_dimensions() {
        let err = GrammarError::geometry(0.0, 0.0, -1.0, 5.0, "width must be positive");
        let msg = err.to_string();
        assert!(msg.contains("width must be positive"));
        assert!(msg.contains("width=-1"));
    }

    #[test]
    fn test_unknown_type_message() {
        let err = GrammarError::UnknownType { kind: "Parcel" };
        assert_eq!(err.to_string(), "no rule registered for region kind `Parcel`");
    }
}
