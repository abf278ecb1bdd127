use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse {field}: {message}")]
    ConfigParse { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CalcError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// HTTP-style status a request boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            _ => 500,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Validation { message } | Self::NotFound { message } => message.clone(),
            Self::InvalidConfigValue { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            Self::ConfigParse { field, .. } => format!("Could not read {}", field),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::CsvError(e) => format!("CSV file could not be processed: {}", e),
            Self::SerializationError(e) => format!("JSON could not be processed: {}", e),
        }
    }

    /// `{"error": "<message>"}` body for a failed calculation.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.user_friendly_message() })
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CalcError::validation("bad").status_code(), 400);
        assert_eq!(CalcError::not_found("Vessel not found.").status_code(), 404);
        let io = CalcError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.status_code(), 500);
    }

    #[test]
    fn test_error_body_carries_plain_message() {
        let err = CalcError::validation("Total volume must be greater than zero.");
        assert_eq!(
            err.to_json(),
            serde_json::json!({"error": "Total volume must be greater than zero."})
        );
        assert_eq!(err.to_string(), "Total volume must be greater than zero.");
    }
}
