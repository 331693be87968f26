use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Invalid input for '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RollError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        RollError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        RollError::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RollError::ValidationError { .. } | RollError::MissingFieldError { .. } => {
                ErrorCategory::Input
            }
            RollError::ConfigError { .. }
            | RollError::InvalidConfigValueError { .. }
            | RollError::TomlError(_) => ErrorCategory::Configuration,
            RollError::ProcessingError { .. }
            | RollError::CsvError(_)
            | RollError::SerializationError(_) => ErrorCategory::Processing,
            RollError::IoError(_) | RollError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the binary.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RollError::ValidationError { field, .. } => {
                format!("Check the value typed in '{}' and try again", field)
            }
            RollError::MissingFieldError { field } => {
                format!("Provide '{}' via its flag or the form file", field)
            }
            RollError::InvalidConfigValueError { field, .. } => {
                format!("Fix '{}' in the settings file", field)
            }
            RollError::ConfigError { .. } | RollError::TomlError(_) => {
                "Make sure the settings file exists and is valid TOML".to_string()
            }
            RollError::IoError(_) | RollError::ZipError(_) => {
                "Check that the output directory is writable".to_string()
            }
            RollError::CsvError(_) | RollError::SerializationError(_) => {
                "Re-run with --verbose to see which step failed".to_string()
            }
            RollError::ProcessingError { .. } => {
                "Review the position parameters; the roll could not be computed".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RollError::ValidationError { field, message } => {
                format!("Invalid form input '{}': {}", field, message)
            }
            RollError::MissingFieldError { field } => {
                format!("Form field '{}' is required", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_exit_with_one() {
        let err = RollError::validation("spot_price", "not a number");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("spot_price"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = RollError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
