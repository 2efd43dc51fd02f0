use crate::domain::model::HLS_MIME_TYPE;
use crate::utils::error::{HlsError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_SEGMENT_TIME: u64 = 10;
pub const PLAYLIST_SUFFIX: &str = ".m3u8";

/// 編碼器的輸出位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub output_dir: PathBuf,
    pub output_name: String,
}

/// 交給外部編碼器的設定檔，`command` 以 `#{...}` 標記可替換的變數
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingProfile {
    pub identifier: String,
    pub name: String,
    pub suffix: String,
    pub mime_type: String,
    pub command: String,
}

impl EncodingProfile {
    /// Stream copy into a segment list, no re-encoding.
    pub fn hls_segmenter(segment_time: u64) -> Self {
        Self {
            identifier: "hls.http".to_string(),
            name: "hls".to_string(),
            suffix: PLAYLIST_SUFFIX.to_string(),
            mime_type: HLS_MIME_TYPE.to_string(),
            command: format!(
                "-i #{{in.video.path}} -codec copy -map 0 -bsf:v h264_mp4toannexb -f segment \
                 -segment_list #{{outputdir}}/#{{outputname}}#{{out.suffix}} \
                 -segment_time {} #{{outputdir}}/#{{outputname}}-%03d.ts",
                segment_time
            ),
        }
    }

    /// 展開命令列參數，先切割再替換，路徑中的空白不會被拆開
    pub fn build_arguments(&self, source: &Path, options: &EncodeOptions) -> Result<Vec<String>> {
        let mut variables = HashMap::new();
        variables.insert("in.video.path", source.to_string_lossy().into_owned());
        variables.insert("outputdir", options.output_dir.to_string_lossy().into_owned());
        variables.insert("outputname", options.output_name.clone());
        variables.insert("out.suffix", self.suffix.clone());

        let re = Regex::new(r"#\{([^}]+)\}")
            .map_err(|e| HlsError::encoding(format!("Invalid placeholder pattern: {}", e)))?;

        self.command
            .split_whitespace()
            .map(|token| {
                let mut missing = None;
                let expanded = re.replace_all(token, |caps: &regex::Captures| {
                    match variables.get(&caps[1]) {
                        Some(value) => value.clone(),
                        None => {
                            missing = Some(caps[1].to_string());
                            String::new()
                        }
                    }
                });
                match missing {
                    Some(name) => Err(HlsError::encoding(format!(
                        "Profile '{}' uses unknown variable '{}'",
                        self.identifier, name
                    ))),
                    None => Ok(expanded.into_owned()),
                }
            })
            .collect()
    }

    /// The argument naming the playlist the encoder will write.
    pub fn output_file(&self, arguments: &[String]) -> Option<PathBuf> {
        arguments
            .iter()
            .rev()
            .find(|arg| arg.ends_with(&self.suffix))
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> EncodeOptions {
        EncodeOptions {
            output_dir: PathBuf::from("/srv/hls/pkg1/track-h264"),
            output_name: "media.mov".to_string(),
        }
    }

    #[test]
    fn test_build_arguments_expands_all_variables() {
        let profile = EncodingProfile::hls_segmenter(10);
        let args = profile
            .build_arguments(Path::new("/work/my media.mov"), &options())
            .unwrap();

        assert_eq!(args[0], "-i");
        assert_eq!(args[1], "/work/my media.mov");
        assert!(args.contains(&"copy".to_string()));
        assert!(args.contains(&"/srv/hls/pkg1/track-h264/media.mov.m3u8".to_string()));
        assert_eq!(
            args.last().unwrap(),
            "/srv/hls/pkg1/track-h264/media.mov-%03d.ts"
        );
        let time_index = args.iter().position(|a| a == "-segment_time").unwrap();
        assert_eq!(args[time_index + 1], "10");
        assert!(args.iter().all(|a| !a.contains("#{")));
    }

    #[test]
    fn test_output_file_is_playlist_argument() {
        let profile = EncodingProfile::hls_segmenter(6);
        let args = profile
            .build_arguments(Path::new("/work/media.mov"), &options())
            .unwrap();

        assert_eq!(
            profile.output_file(&args),
            Some(PathBuf::from("/srv/hls/pkg1/track-h264/media.mov.m3u8"))
        );
    }

    #[test]
    fn test_unknown_variable_is_rejected() {
        let mut profile = EncodingProfile::hls_segmenter(10);
        profile.command = "-i #{in.audio.path}".to_string();

        let err = profile
            .build_arguments(Path::new("/work/media.mov"), &options())
            .unwrap_err();
        assert!(matches!(err, HlsError::EncodingError { .. }));
    }
}
