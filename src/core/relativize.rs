//! Playlist relativization.
//!
//! The segmenter writes playlists whose segment lines are absolute paths into
//! its own output directory. Before a playlist can be served those lines have
//! to become bare file names, and the segments have to sit next to the
//! playlist under names derived from the playlist's base name.

use crate::domain::profile::PLAYLIST_SUFFIX;
use crate::utils::error::{HlsError, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 改寫 `source` 播放清單並寫到 `destination`，同時搬移所有引用的切片檔
///
/// 回傳搬移後的切片路徑。`source` 與 `destination` 可以是同一個檔案。
pub fn relativize(source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    let source_dir = parent_dir(source)?;
    let destination_dir = parent_dir(destination)?;
    let old_base = playlist_base_name(source)?;
    let new_base = playlist_base_name(destination)?;

    let temp_path = destination_dir.join(format!(".{}.tmp", new_base));

    let result = rewrite(
        source,
        &temp_path,
        source_dir,
        destination_dir,
        &old_base,
        &new_base,
    );

    let relocated = match result {
        Ok(relocated) => relocated,
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&temp_path, destination) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if source != destination {
        fs::remove_file(source)?;
    }

    tracing::debug!(
        "Relativized {} into {} ({} segments)",
        source.display(),
        destination.display(),
        relocated.len()
    );

    Ok(relocated)
}

fn rewrite(
    source: &Path,
    output: &Path,
    source_dir: &Path,
    destination_dir: &Path,
    old_base: &str,
    new_base: &str,
) -> Result<Vec<PathBuf>> {
    let reader = BufReader::new(File::open(source)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let mut relocated = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');

        match segment_reference(line, source_dir) {
            Some(segment) => {
                let file_name = segment
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let new_name = file_name.replacen(old_base, new_base, 1);
                let target = destination_dir.join(&new_name);

                move_file(&segment, &target)?;
                writeln!(writer, "{}", new_name)?;
                relocated.push(target);
            }
            None => writeln!(writer, "{}", line)?,
        }
    }

    writer.flush()?;
    Ok(relocated)
}

/// 判斷一行是否為切片引用，回傳切片的實際路徑
///
/// `#` 開頭的指令行永遠原樣保留，即使內容剛好以來源目錄開頭。
pub fn segment_reference(line: &str, source_dir: &Path) -> Option<PathBuf> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let path = Path::new(trimmed);
    if path.is_absolute() {
        return (path.parent() == Some(source_dir)).then(|| path.to_path_buf());
    }

    // bare sibling name
    if path.components().count() == 1 && !trimmed.contains("://") {
        return Some(source_dir.join(path));
    }

    None
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if from == to {
        return if from.is_file() {
            Ok(())
        } else {
            Err(HlsError::encoding(format!(
                "Segment {} referenced by the playlist does not exist",
                from.display()
            )))
        };
    }

    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // rename fails across filesystems
    fs::copy(from, to)
        .and_then(|_| fs::remove_file(from))
        .map_err(|e| {
            HlsError::encoding(format!(
                "Unable to move segment {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })
}

fn parent_dir(path: &Path) -> Result<&Path> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| {
            HlsError::validation(format!("Playlist {} has no parent directory", path.display()))
        })
}

fn playlist_base_name(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| HlsError::validation(format!("{} is not a file", path.display())))?;

    Ok(name
        .strip_suffix(PLAYLIST_SUFFIX)
        .map(str::to_string)
        .unwrap_or(name))
}
