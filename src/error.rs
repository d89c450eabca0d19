use thiserror::Error;

/// Main error type for sour operations
#[derive(Error, Debug)]
pub enum SourError {
    /// The field was never analyzed for the current document
    #[error("no field named: {0}")]
    FieldNotFound(String),

    #[error("unknown doc number: {0}")]
    DocumentNumberOutOfRange(u64),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for sour operations
pub type Result<T> = std::result::Result<T, SourError>;

impl SourError {
    /// Check if this error only means "the current document has no data here".
    ///
    /// Consumer-facing segment operations turn these into empty results.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, SourError::FieldNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourError::FieldNotFound("title".to_string());
        assert_eq!(err.to_string(), "no field named: title");

        let err = SourError::DocumentNumberOutOfRange(7);
        assert_eq!(err.to_string(), "unknown doc number: 7");
    }

    #[test]
    fn test_missing_data_errors() {
        assert!(SourError::FieldNotFound("x".to_string()).is_missing_data());
        assert!(!SourError::DocumentNumberOutOfRange(1).is_missing_data());
        assert!(!SourError::InvalidQuery("bad".to_string()).is_missing_data());
    }
}
