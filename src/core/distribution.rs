use crate::core::acceptance::accepts;
use crate::core::layout::{base_file_name, DistributionLayout};
use crate::core::relativize::relativize;
use crate::core::{AssetStore, ConfigProvider, Element, Encoder, Package};
use crate::domain::model::HLS_MIME_TYPE;
use crate::domain::profile::{EncodeOptions, EncodingProfile, PLAYLIST_SUFFIX};
use crate::utils::error::{HlsError, Result};
use crate::utils::validation::validate_identifier;
use std::fs;
use std::path::{Path, PathBuf};

/// HLS 發佈引擎：切片、搬移並產生發佈後的元素；以及反向的撤回
///
/// 所有操作都是同步阻塞的檔案系統與子行程操作，由外部佇列決定在哪個執行緒上跑。
pub struct DistributionEngine<W: AssetStore, E: Encoder> {
    workspace: W,
    encoder: E,
    layout: DistributionLayout,
    profile: EncodingProfile,
}

impl<W: AssetStore, E: Encoder> DistributionEngine<W, E> {
    pub fn new<C: ConfigProvider>(workspace: W, encoder: E, config: &C) -> Result<Self> {
        let layout = DistributionLayout::new(config.distribution_directory(), config.service_url())?;
        tracing::info!("HLS distribution directory is {}", layout.root().display());

        Ok(Self {
            workspace,
            encoder,
            layout,
            profile: EncodingProfile::hls_segmenter(config.segment_time()),
        })
    }

    pub fn layout(&self) -> &DistributionLayout {
        &self.layout
    }

    /// 發佈單一元素，不支援的元素回傳 `None`
    pub fn distribute_element(
        &self,
        package: &Package,
        element_id: &str,
        check_availability: bool,
    ) -> Result<Option<Element>> {
        let element = resolve_element(package, element_id)?;

        if !accepts(element) {
            tracing::debug!(
                "Skipping {} {} for distribution to the HLS channel",
                element.element_type.as_str(),
                element_id
            );
            return Ok(None);
        }

        self.distribute_accepted(package, element_id, element, check_availability)
            .map(Some)
            .map_err(|e| {
                tracing::warn!("Error distributing {}: {}", element_id, e);
                e.into_distribution(format!("Error distributing element {}", element_id))
            })
    }

    fn distribute_accepted(
        &self,
        package: &Package,
        element_id: &str,
        element: &Element,
        check_availability: bool,
    ) -> Result<Element> {
        let source = self.workspace.get(&element.uri).map_err(|e| match e {
            HlsError::NotFoundError { .. } => HlsError::distribution(
                format!("Unable to find {} in the workspace", element.uri),
                e,
            ),
            other => HlsError::distribution(
                format!("Error loading {} from the workspace", element.uri),
                other,
            ),
        })?;

        let base_name = base_file_name(&element.uri)?;
        let destination = self
            .layout
            .destination_path(&package.id, element_id, &base_name)?;
        let destination_dir = destination
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.layout.root().to_path_buf());

        fs::create_dir_all(&destination_dir).map_err(|e| {
            HlsError::distribution(
                format!("Unable to create {}", destination_dir.display()),
                e.into(),
            )
        })?;
        tracing::debug!("Distributing {} to {}", element_id, destination.display());

        let options = EncodeOptions {
            output_dir: destination_dir.clone(),
            output_name: output_name(&destination),
        };
        let playlist = self
            .encoder
            .encode(&source, &self.profile, &options)
            .map_err(|e| {
                HlsError::distribution(
                    format!(
                        "Unable to generate HLS segments and playlists for {} in {}",
                        source.display(),
                        destination_dir.display()
                    ),
                    e,
                )
            })?;

        let segments = relativize(&playlist, &destination)?;

        if check_availability {
            check_available(&destination, &segments)?;
        }

        let uri = self.layout.public_uri(&package.id, element_id, &base_name)?;
        let distributed = element.distributed_copy(uri, HLS_MIME_TYPE);

        tracing::info!(
            "Finished distribution of {} ({} segments)",
            element_id,
            segments.len()
        );
        Ok(distributed)
    }

    /// 撤回已發佈的元素；目錄不存在視為錯誤而非靜默成功
    pub fn retract_element(&self, package: &Package, element_id: &str) -> Result<Option<Element>> {
        let element = resolve_element(package, element_id)?;

        if !accepts(element) {
            tracing::debug!(
                "{} {} was never distributed to the HLS channel",
                element.element_type.as_str(),
                element_id
            );
            return Ok(None);
        }

        self.retract_accepted(package, element_id, element)
            .map(|_| Some(element.clone()))
            .map_err(|e| {
                tracing::warn!(
                    "Error retracting element {} of mediapackage {}: {}",
                    element_id,
                    package.id,
                    e
                );
                e.into_distribution(format!(
                    "Error retracting element {} of mediapackage {}",
                    element_id, package.id
                ))
            })
    }

    fn retract_accepted(&self, package: &Package, element_id: &str, element: &Element) -> Result<()> {
        let origin_id = element.origin_identifier().unwrap_or(element_id);
        let package_dir = self.layout.package_directory(&package.id)?;
        let element_dir = self.layout.element_directory(&package.id, origin_id)?;

        if !element_dir.is_dir() {
            return Err(HlsError::not_found(format!(
                "Track directory does not exist: {}",
                element_dir.display()
            )));
        }

        fs::remove_dir_all(&element_dir)?;
        tracing::info!("Removed track folder: {}", element_dir.display());

        if is_empty_dir(&package_dir)? {
            fs::remove_dir(&package_dir)?;
            tracing::info!(
                "Removed parent folder since it is empty: {}",
                package_dir.display()
            );
        }

        tracing::info!(
            "Finished retracting element {} of mediapackage {}",
            element_id,
            package.id
        );
        Ok(())
    }
}

fn resolve_element<'a>(package: &'a Package, element_id: &str) -> Result<&'a Element> {
    validate_identifier("Mediapackage ID", &package.id)?;
    if element_id.trim().is_empty() {
        return Err(HlsError::validation("Element ID must be specified"));
    }

    package.element_by_id(element_id).ok_or_else(|| {
        HlsError::validation(format!(
            "No element {} found in mediapackage {}",
            element_id, package.id
        ))
    })
}

/// `media.mov.m3u8` → `media.mov`
fn output_name(destination: &Path) -> String {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(PLAYLIST_SUFFIX)
        .map(str::to_string)
        .unwrap_or(name)
}

fn check_available(playlist: &Path, segments: &[PathBuf]) -> Result<()> {
    for path in std::iter::once(playlist).chain(segments.iter().map(PathBuf::as_path)) {
        if !path.is_file() {
            return Err(HlsError::not_found(format!(
                "Distributed file {} is not available",
                path.display()
            )));
        }
    }
    Ok(())
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}
