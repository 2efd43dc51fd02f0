use crate::domain::job::{Job, JobId};
use crate::domain::profile::{EncodeOptions, EncodingProfile};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

/// 將邏輯 URI 解析成本機檔案
pub trait AssetStore: Send + Sync {
    fn get(&self, uri: &Url) -> Result<PathBuf>;
}

/// 外部切片器，回傳產生的播放清單路徑
pub trait Encoder: Send + Sync {
    fn encode(
        &self,
        source: &Path,
        profile: &EncodingProfile,
        options: &EncodeOptions,
    ) -> Result<PathBuf>;
}

pub trait ConfigProvider: Send + Sync {
    fn distribution_directory(&self) -> &Path;
    fn service_url(&self) -> &str;
    fn encoder_binary(&self) -> &str;
    fn segment_time(&self) -> u64;
}

/// Executes one dequeued job and returns its result payload.
pub trait JobProcessor: Send + Sync {
    fn process(&self, operation: &str, arguments: &[String]) -> Result<Option<String>>;
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn create_job(&self, job_type: &str, operation: &str, arguments: Vec<String>)
        -> Result<Job>;
    async fn job(&self, id: JobId) -> Result<Job>;
}
