use thiserror::Error;

/// Core error type for the Stepwise wizard engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Wizard definition is malformed
    #[error("Definition error: {0}")]
    DefinitionError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An illegal navigation transition was attempted
    #[error("Navigation blocked: {0}")]
    NavigationBlocked(String),

    /// Template could not be applied
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Draft store error
    #[error("Draft store error: {0}")]
    DraftStoreError(String),

    /// Record store error
    #[error("Record store error: {0}")]
    RecordStoreError(String),

    /// A record creation failed during batch submission
    #[error("Submission failed at step '{step}' creating '{table}': {reason}")]
    SubmissionFailed {
        /// Step whose mapping was being submitted
        step: String,
        /// Target table of the failed creation
        table: String,
        /// Underlying store error message
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationError(err.to_string())
    }
}

impl From<String> for EngineError {
    fn from(err: String) -> Self {
        EngineError::Other(err)
    }
}

impl From<&str> for EngineError {
    fn from(err: &str) -> Self {
        EngineError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (
                EngineError::DefinitionError("dup id".to_string()),
                "Definition error: dup id",
            ),
            (
                EngineError::ValidationError("bad field".to_string()),
                "Validation error: bad field",
            ),
            (
                EngineError::NavigationBlocked("step invalid".to_string()),
                "Navigation blocked: step invalid",
            ),
            (
                EngineError::TemplateError("unknown step".to_string()),
                "Template error: unknown step",
            ),
            (
                EngineError::DraftStoreError("io".to_string()),
                "Draft store error: io",
            ),
            (
                EngineError::RecordStoreError("conn reset".to_string()),
                "Record store error: conn reset",
            ),
            (
                EngineError::SerializationError("eof".to_string()),
                "Serialization error: eof",
            ),
            (EngineError::Other("other".to_string()), "other"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_submission_failed_carries_context() {
        let err = EngineError::SubmissionFailed {
            step: "venue".to_string(),
            table: "venue_contracts".to_string(),
            reason: "unique violation".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("venue"));
        assert!(msg.contains("venue_contracts"));
        assert!(msg.contains("unique violation"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: EngineError = json_error.into();

        match error {
            EngineError::SerializationError(msg) => {
                assert!(msg.contains("expected value"));
            }
            _ => panic!("Expected SerializationError variant"),
        }
    }

    #[test]
    fn test_from_string_and_str() {
        let error: EngineError = "boom".into();
        assert_eq!(error, EngineError::Other("boom".to_string()));

        let error: EngineError = "boom".to_string().into();
        assert_eq!(error, EngineError::Other("boom".to_string()));
    }
}
