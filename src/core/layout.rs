use crate::domain::profile::PLAYLIST_SUFFIX;
use crate::utils::error::{HlsError, Result};
use crate::utils::validation::validate_identifier;
use std::path::{Path, PathBuf};
use url::Url;

/// 來源檔名（保留副檔名），例如 `file:///data/media.mov` → `media.mov`
pub fn base_file_name(uri: &Url) -> Result<String> {
    let name = if uri.scheme() == "file" {
        uri.to_file_path()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
    } else {
        uri.path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string)
    };

    match name {
        Some(n) if !n.is_empty() => Ok(n),
        _ => Err(HlsError::validation(format!(
            "Element URI {} does not name a file",
            uri
        ))),
    }
}

pub fn playlist_file_name(base_file_name: &str) -> String {
    format!("{}{}", base_file_name, PLAYLIST_SUFFIX)
}

/// `{root}/{packageId}/{elementId}/{baseFileName}.m3u8`
pub fn destination_path(
    root: &Path,
    package_id: &str,
    element_id: &str,
    base_file_name: &str,
) -> PathBuf {
    root.join(package_id)
        .join(element_id)
        .join(playlist_file_name(base_file_name))
}

/// `{baseUrl}/{packageId}/{elementId}/{baseFileName}.m3u8`
pub fn public_uri(
    base_url: &str,
    package_id: &str,
    element_id: &str,
    base_file_name: &str,
) -> Result<Url> {
    let playlist = playlist_file_name(base_file_name);
    let mut uri = Url::parse(base_url).map_err(|e| {
        HlsError::validation(format!("Invalid distribution base URL '{}': {}", base_url, e))
    })?;

    // 每個部分各自成為一個路徑片段，`#`、`?` 等字元會被百分比編碼
    uri.path_segments_mut()
        .map_err(|_| {
            HlsError::validation(format!(
                "Distribution base URL '{}' cannot carry a path",
                base_url
            ))
        })?
        .pop_if_empty()
        .extend([package_id, element_id, playlist.as_str()]);

    Ok(uri)
}

/// 發佈目錄與公開 URL 的配置，啟動時設定之後唯讀
#[derive(Debug, Clone)]
pub struct DistributionLayout {
    root: PathBuf,
    base_url: String,
}

impl DistributionLayout {
    pub fn new(root: impl AsRef<Path>, base_url: &str) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())?;
        Url::parse(base_url).map_err(|e| HlsError::InvalidConfigValueError {
            field: "distribution.url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        Ok(Self {
            root,
            base_url: base_url.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn package_directory(&self, package_id: &str) -> Result<PathBuf> {
        validate_identifier("Mediapackage ID", package_id)?;
        Ok(self.root.join(package_id))
    }

    pub fn element_directory(&self, package_id: &str, element_id: &str) -> Result<PathBuf> {
        validate_identifier("Element ID", element_id)?;
        Ok(self.package_directory(package_id)?.join(element_id))
    }

    pub fn destination_path(
        &self,
        package_id: &str,
        element_id: &str,
        base_file_name: &str,
    ) -> Result<PathBuf> {
        validate_identifier("Mediapackage ID", package_id)?;
        validate_identifier("Element ID", element_id)?;
        Ok(destination_path(
            &self.root,
            package_id,
            element_id,
            base_file_name,
        ))
    }

    pub fn public_uri(
        &self,
        package_id: &str,
        element_id: &str,
        base_file_name: &str,
    ) -> Result<Url> {
        public_uri(&self.base_url, package_id, element_id, base_file_name)
    }
}
