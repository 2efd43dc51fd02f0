use crate::core::dispatch::DEFAULT_POLL_INTERVAL;
use crate::core::ConfigProvider;
use crate::domain::profile::DEFAULT_SEGMENT_TIME;
use crate::utils::error::{HlsError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENCODER_BINARY: &str = "ffmpeg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub distribution: ChannelConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub directory: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub binary: Option<String>,
    pub segment_time: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobsConfig {
    pub timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl DistributionConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| HlsError::ConfigError {
            message: format!("Unable to read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HlsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HLS_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HlsError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("distribution.url", &self.distribution.url)?;
        validate_path(
            "distribution.directory",
            &self.distribution.directory.to_string_lossy(),
        )?;

        if let Some(binary) = &self.encoder.binary {
            validate_path("encoder.binary", binary)?;
        }
        if let Some(segment_time) = self.encoder.segment_time {
            validate_positive_number("encoder.segment_time", segment_time, 1)?;
        }
        if let Some(interval) = self.jobs.poll_interval_ms {
            validate_positive_number("jobs.poll_interval_ms", interval, 1)?;
        }

        Ok(())
    }

    /// 未設定時不設逾時，等到工作結束為止
    pub fn job_timeout(&self) -> Option<Duration> {
        self.jobs.timeout_ms.map(Duration::from_millis)
    }

    pub fn poll_interval(&self) -> Duration {
        self.jobs
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.level.as_deref()
    }

    pub fn json_logging(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl ConfigProvider for DistributionConfig {
    fn distribution_directory(&self) -> &Path {
        &self.distribution.directory
    }

    fn service_url(&self) -> &str {
        &self.distribution.url
    }

    fn encoder_binary(&self) -> &str {
        self.encoder
            .binary
            .as_deref()
            .unwrap_or(DEFAULT_ENCODER_BINARY)
    }

    fn segment_time(&self) -> u64 {
        self.encoder.segment_time.unwrap_or(DEFAULT_SEGMENT_TIME)
    }
}

impl Validate for DistributionConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
