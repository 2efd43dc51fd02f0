use crate::core::Encoder;
use crate::domain::profile::{EncodeOptions, EncodingProfile};
use crate::utils::error::{HlsError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const STDERR_TAIL_LINES: usize = 10;

/// 以外部 ffmpeg 行程執行切片
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: String,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn command_line(
        &self,
        source: &Path,
        profile: &EncodingProfile,
        options: &EncodeOptions,
    ) -> Result<Vec<String>> {
        let mut args = vec!["-nostdin".to_string(), "-y".to_string()];
        args.extend(profile.build_arguments(source, options)?);
        Ok(args)
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(
        &self,
        source: &Path,
        profile: &EncodingProfile,
        options: &EncodeOptions,
    ) -> Result<PathBuf> {
        let args = self.command_line(source, profile, options)?;
        let playlist = profile.output_file(&args).ok_or_else(|| {
            HlsError::encoding(format!(
                "Profile '{}' does not name a {} output",
                profile.identifier, profile.suffix
            ))
        })?;

        tracing::debug!("Executing {} {}", self.binary, args.join(" "));
        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| HlsError::encoding(format!("Unable to start {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(HlsError::encoding(format!(
                "{} exited with {} while encoding {}: {}",
                self.binary,
                output.status,
                source.display(),
                tail
            )));
        }

        if !playlist.is_file() {
            return Err(HlsError::encoding(format!(
                "{} did not produce playlist {}",
                self.binary,
                playlist.display()
            )));
        }

        tracing::debug!("Encoder wrote {}", playlist.display());
        Ok(playlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> EncodeOptions {
        EncodeOptions {
            output_dir: PathBuf::from("/tmp/hls-out"),
            output_name: "media.mov".to_string(),
        }
    }

    #[test]
    fn test_command_line_starts_non_interactive() {
        let encoder = FfmpegEncoder::new("ffmpeg");
        let profile = EncodingProfile::hls_segmenter(10);

        let args = encoder
            .command_line(Path::new("/work/media.mov"), &profile, &options())
            .unwrap();

        assert_eq!(&args[..4], &["-nostdin", "-y", "-i", "/work/media.mov"]);
        assert_eq!(
            profile.output_file(&args),
            Some(PathBuf::from("/tmp/hls-out/media.mov.m3u8"))
        );
    }

    #[test]
    fn test_missing_binary_is_encoding_error() {
        let encoder = FfmpegEncoder::new("/nonexistent/bin/ffmpeg");
        let err = encoder
            .encode(
                Path::new("/work/media.mov"),
                &EncodingProfile::hls_segmenter(10),
                &options(),
            )
            .unwrap_err();

        assert!(matches!(err, HlsError::EncodingError { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_process_is_encoding_error() {
        let encoder = FfmpegEncoder::new("false");
        let err = encoder
            .encode(
                Path::new("/work/media.mov"),
                &EncodingProfile::hls_segmenter(10),
                &options(),
            )
            .unwrap_err();

        assert!(err.to_string().contains("exited with"));
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_playlist_is_encoding_error() {
        let encoder = FfmpegEncoder::new("true");
        let err = encoder
            .encode(
                Path::new("/work/media.mov"),
                &EncodingProfile::hls_segmenter(10),
                &options(),
            )
            .unwrap_err();

        assert!(err.to_string().contains("did not produce playlist"));
    }
}
