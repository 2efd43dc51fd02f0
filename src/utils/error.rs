use thiserror::Error;

#[derive(Error, Debug)]
pub enum HlsError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Not found: {message}")]
    NotFoundError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Encoding error: {message}")]
    EncodingError { message: String },

    #[error("{message}: {source}")]
    DistributionError {
        message: String,
        #[source]
        source: Box<HlsError>,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("This service can't handle operations of type '{operation}'")]
    UnknownOperation { operation: String },

    #[error("Job error: {message}")]
    JobError { message: String },
}

/// 錯誤分類，用於日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Storage,
    Encoding,
    Distribution,
    Configuration,
    Job,
}

/// 錯誤嚴重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HlsError {
    pub fn validation(message: impl Into<String>) -> Self {
        HlsError::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HlsError::NotFoundError {
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        HlsError::EncodingError {
            message: message.into(),
        }
    }

    pub fn distribution(message: impl Into<String>, cause: HlsError) -> Self {
        HlsError::DistributionError {
            message: message.into(),
            source: Box::new(cause),
        }
    }

    /// 在操作邊界包裝成 DistributionError，已是 DistributionError 則原樣返回
    pub fn into_distribution(self, message: impl Into<String>) -> Self {
        match self {
            e @ HlsError::DistributionError { .. } => e,
            other => HlsError::distribution(message, other),
        }
    }

    /// 沿著 DistributionError 鏈找到最底層的原因
    pub fn root_cause(&self) -> &HlsError {
        match self {
            HlsError::DistributionError { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            HlsError::ValidationError { .. } | HlsError::SerializationError(_) => {
                ErrorCategory::Input
            }
            HlsError::NotFoundError { .. } | HlsError::IoError(_) => ErrorCategory::Storage,
            HlsError::EncodingError { .. } => ErrorCategory::Encoding,
            HlsError::DistributionError { .. } => ErrorCategory::Distribution,
            HlsError::ConfigError { .. }
            | HlsError::ConfigValidationError { .. }
            | HlsError::InvalidConfigValueError { .. }
            | HlsError::UnknownOperation { .. } => ErrorCategory::Configuration,
            HlsError::JobError { .. } => ErrorCategory::Job,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HlsError::ValidationError { .. } | HlsError::NotFoundError { .. } => {
                ErrorSeverity::High
            }
            HlsError::JobError { .. } => ErrorSeverity::Medium,
            HlsError::DistributionError { source, .. } => source.severity(),
            HlsError::IoError(_) | HlsError::EncodingError { .. } => ErrorSeverity::High,
            HlsError::SerializationError(_) => ErrorSeverity::High,
            HlsError::ConfigError { .. }
            | HlsError::ConfigValidationError { .. }
            | HlsError::InvalidConfigValueError { .. }
            | HlsError::UnknownOperation { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.root_cause() {
            HlsError::ValidationError { .. } => {
                "Check the package file and the element identifier".to_string()
            }
            HlsError::NotFoundError { .. } => {
                "Make sure the source asset exists in the workspace".to_string()
            }
            HlsError::IoError(_) => {
                "Check permissions and free space of the distribution directory".to_string()
            }
            HlsError::EncodingError { .. } => {
                "Check that ffmpeg is installed and the source uses H.264/AAC codecs".to_string()
            }
            HlsError::SerializationError(_) => "Check that the package file is valid JSON".to_string(),
            HlsError::ConfigError { .. }
            | HlsError::ConfigValidationError { .. }
            | HlsError::InvalidConfigValueError { .. } => {
                "Review the [distribution] and [encoder] sections of the config file".to_string()
            }
            HlsError::UnknownOperation { .. } => {
                "Only 'Distribute' and 'Retract' jobs can be processed".to_string()
            }
            HlsError::JobError { .. } => {
                "Increase jobs.timeout_ms or inspect the job failure detail".to_string()
            }
            HlsError::DistributionError { .. } => "Retry the operation".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HlsError::DistributionError { message, .. } => {
                format!("{} ({})", message, self.root_cause())
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HlsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_distribution_wraps_once() {
        let wrapped = HlsError::encoding("segment missing").into_distribution("outer");
        let rewrapped = wrapped.into_distribution("second");

        match &rewrapped {
            HlsError::DistributionError { message, source } => {
                assert_eq!(message, "outer");
                assert!(matches!(**source, HlsError::EncodingError { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(rewrapped.category(), ErrorCategory::Distribution);
    }

    #[test]
    fn test_cause_is_kept_in_chain() {
        let err = HlsError::distribution("Unable to find asset", HlsError::not_found("media.mov"));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "Not found: media.mov");
        assert_eq!(err.to_string(), "Unable to find asset: Not found: media.mov");
    }

    #[test]
    fn test_severity_follows_root_cause() {
        let err = HlsError::distribution("x", HlsError::JobError { message: "t".into() });
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(
            HlsError::UnknownOperation { operation: "Foo".into() }.severity(),
            ErrorSeverity::Critical
        );
    }
}
