//! Error types for nodeforge
//!
//! Inference problems are deliberately *not* errors: the builders isolate
//! per-field failures as [`crate::schema::InferenceWarning`]s and omit the
//! field. The variants here cover API misuse and collaborator interop.

use thiserror::Error;

/// The main error type for nodeforge
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot infer a schema from an empty node set")]
    EmptyNodeSet,

    #[error("Schema inference failed: {message}")]
    SchemaInference { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a schema inference error
    pub fn schema_inference(message: impl Into<String>) -> Self {
        Self::SchemaInference {
            message: message.into(),
        }
    }
}

/// Result type alias for nodeforge
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyNodeSet;
        assert_eq!(
            err.to_string(),
            "Cannot infer a schema from an empty node set"
        );

        let err = Error::schema_inference("bad example value");
        assert_eq!(
            err.to_string(),
            "Schema inference failed: bad example value"
        );
    }

    #[test]
    fn test_json_parse_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse_err.into();
        assert!(err.to_string().starts_with("Failed to parse JSON"));
    }
}
