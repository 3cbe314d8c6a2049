use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("Invalid South African phone number: {input:?}")]
    InvalidPhoneNumber { input: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Source '{source_name}' failed: {message}")]
    SourceFailure {
        source_name: String,
        message: String,
    },

    #[error("Source '{source_name}' timed out after {timeout:?}")]
    SourceTimeout {
        source_name: String,
        timeout: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    Storage,
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReconError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReconError::InvalidPhoneNumber { .. } => ErrorCategory::Input,
            ReconError::ConfigValidationError { .. }
            | ReconError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ReconError::Http(_) => ErrorCategory::Network,
            ReconError::IoError(_) | ReconError::SerializationError(_) => ErrorCategory::Storage,
            ReconError::SourceFailure { .. } | ReconError::SourceTimeout { .. } => {
                ErrorCategory::Source
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單一來源失敗只影響該來源的結果
            ErrorCategory::Source => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReconError::InvalidPhoneNumber { .. } => {
                "Use a South African mobile number such as 0821234567 or +27821234567"
            }
            ReconError::Http(_) => "Check your network connection and try again later",
            ReconError::IoError(_) => "Check that the output directory exists and is writable",
            ReconError::SerializationError(_) => "The report could not be encoded; run with --verbose for details",
            ReconError::ConfigValidationError { .. } | ReconError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command-line flags"
            }
            ReconError::SourceFailure { .. } => "The source may have changed its pages; other sources are unaffected",
            ReconError::SourceTimeout { .. } => "Increase --timeout or retry later",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReconError::InvalidPhoneNumber { .. } => {
                "Invalid South African phone number format. Valid formats: 0821234567 or +27821234567"
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    /// 依嚴重程度對應程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
