use crate::utils::error::{HlsError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(HlsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(HlsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(HlsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(HlsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(HlsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(HlsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 檢查識別碼可以安全地當作單一目錄名稱使用
pub fn validate_identifier(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HlsError::validation(format!("{} must be specified", field_name)));
    }

    if value == "." || value == ".." || value.contains(['/', '\\', '\0']) {
        return Err(HlsError::validation(format!(
            "{} '{}' cannot be used as a directory name",
            field_name, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("distribution.url", "https://example.com/hls").is_ok());
        assert!(validate_url("distribution.url", "http://example.com").is_ok());
        assert!(validate_url("distribution.url", "").is_err());
        assert!(validate_url("distribution.url", "invalid-url").is_err());
        assert!(validate_url("distribution.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("encoder.segment_time", 10, 1).is_ok());
        assert!(validate_positive_number("encoder.segment_time", 0, 1).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("Element ID", "track-h264").is_ok());
        assert!(validate_identifier("Element ID", "").is_err());
        assert!(validate_identifier("Element ID", "   ").is_err());
        assert!(validate_identifier("Element ID", "..").is_err());
        assert!(validate_identifier("Element ID", "a/b").is_err());
    }
}
