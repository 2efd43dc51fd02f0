use crate::core::AssetStore;
use crate::utils::error::{HlsError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use url::Url;

/// 本機工作區：`file://` URI 直接對應到檔案，其他 URI 對應到 `{root}/{host}/{path}`
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    root: PathBuf,
}

impl LocalWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn local_path(&self, uri: &Url) -> Result<PathBuf> {
        if uri.scheme() == "file" {
            return uri
                .to_file_path()
                .map_err(|_| HlsError::not_found(format!("{} is not a local file URI", uri)));
        }

        let mut path = self.root.join(uri.host_str().unwrap_or("localhost"));
        for segment in uri.path_segments().into_iter().flatten() {
            if segment.is_empty() || segment == "." || segment == ".." {
                continue;
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl AssetStore for LocalWorkspace {
    fn get(&self, uri: &Url) -> Result<PathBuf> {
        let path = self.local_path(uri)?;

        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                tracing::debug!("Resolved {} to {}", uri, path.display());
                Ok(path)
            }
            Ok(_) => Err(HlsError::not_found(format!(
                "{} does not resolve to a file",
                uri
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(HlsError::not_found(format!(
                "{} not found at {}",
                uri,
                path.display()
            ))),
            Err(e) => Err(HlsError::IoError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolves_file_uri() {
        let temp = TempDir::new().unwrap();
        let media = temp.path().join("media.mov");
        fs::write(&media, b"mov").unwrap();

        let workspace = LocalWorkspace::new(temp.path());
        let uri = Url::from_file_path(&media).unwrap();

        assert_eq!(workspace.get(&uri).unwrap(), media);
    }

    #[test]
    fn test_resolves_remote_uri_under_root() {
        let temp = TempDir::new().unwrap();
        let cached = temp.path().join("storage.example.com").join("files").join("media.aac");
        fs::create_dir_all(cached.parent().unwrap()).unwrap();
        fs::write(&cached, b"aac").unwrap();

        let workspace = LocalWorkspace::new(temp.path());
        let uri = Url::parse("https://storage.example.com/files/media.aac").unwrap();

        assert_eq!(workspace.get(&uri).unwrap(), cached);
    }

    #[test]
    fn test_missing_asset_is_not_found() {
        let temp = TempDir::new().unwrap();
        let workspace = LocalWorkspace::new(temp.path());

        let uri = Url::from_file_path(temp.path().join("missing.mov")).unwrap();
        assert!(matches!(
            workspace.get(&uri).unwrap_err(),
            HlsError::NotFoundError { .. }
        ));

        let dir_uri = Url::from_file_path(temp.path()).unwrap();
        assert!(matches!(
            workspace.get(&dir_uri).unwrap_err(),
            HlsError::NotFoundError { .. }
        ));
    }
}
