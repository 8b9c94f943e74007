use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to load artifact '{artifact}': {message}")]
    ArtifactError { artifact: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Missing feature: {field}")]
    MissingFeature { field: String },

    #[error("Feature '{field}' is not numeric after encoding")]
    NonNumericFeature { field: String },

    #[error("Model scoring failed: {message}")]
    ModelScoring { message: String },

    #[error("Failed to fetch news: {message}")]
    FeedFetch { message: String },

    #[error("Failed to fetch news, status code: {status}")]
    FeedStatus { status: u16 },

    #[error("Failed to parse news response: {message}")]
    FeedDecode { message: String },

    #[error("No articles found")]
    EmptyResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Artifact,
    Request,
    Model,
    Feed,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::ArtifactError { .. } => ErrorCategory::Artifact,
            Self::ValidationError { .. }
            | Self::MissingFeature { .. }
            | Self::NonNumericFeature { .. } => ErrorCategory::Request,
            Self::ModelScoring { .. } => ErrorCategory::Model,
            Self::HttpError(_)
            | Self::FeedFetch { .. }
            | Self::FeedStatus { .. }
            | Self::FeedDecode { .. }
            | Self::EmptyResult => ErrorCategory::Feed,
            Self::CsvError(_) | Self::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Artifact => ErrorSeverity::Critical,
            ErrorCategory::Io => ErrorSeverity::High,
            ErrorCategory::Model | ErrorCategory::Feed => ErrorSeverity::Medium,
            ErrorCategory::Request => ErrorSeverity::Low,
        }
    }

    /// Errors that must stop the process instead of being answered per request.
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ArtifactError { artifact, .. } => format!(
                "The model artifact '{}' could not be loaded; the service cannot start",
                artifact
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML file and command line flags",
            ErrorCategory::Artifact => {
                "Re-export the trained model files into the artifact directory"
            }
            ErrorCategory::Request => "Check the request body against the expected fields",
            ErrorCategory::Model => "Verify the model was exported for the current feature order",
            ErrorCategory::Feed => "Check the news provider status and API key",
            ErrorCategory::Io => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_status_message() {
        let err = ServiceError::FeedStatus { status: 503 };
        assert_eq!(err.to_string(), "Failed to fetch news, status code: 503");
        assert_eq!(err.category(), ErrorCategory::Feed);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_artifact_errors_are_fatal() {
        let err = ServiceError::ArtifactError {
            artifact: "scaler.json".to_string(),
            message: "missing".to_string(),
        };
        assert!(err.is_fatal());
        assert!(err.user_friendly_message().contains("scaler.json"));
    }

    #[test]
    fn test_request_errors_are_low_severity() {
        let err = ServiceError::MissingFeature {
            field: "trim".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.to_string(), "Missing feature: trim");
    }
}
