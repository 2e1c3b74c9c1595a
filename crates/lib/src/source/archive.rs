//! Tarball extraction.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::info;

use super::SourceError;

/// Unpack a `.tar.gz` / `.tgz` archive into `dest`, stripping the top-level
/// directory (`MUMPS_4.10.0/`).
pub fn unpack(archive_path: &Path, dest: &Path) -> Result<PathBuf, SourceError> {
  let name = archive_path.to_string_lossy();
  if !(name.ends_with(".tar.gz") || name.ends_with(".tgz")) {
    return Err(SourceError::UnsupportedArchive(archive_path.to_path_buf()));
  }

  fs::create_dir_all(dest)?;

  let file = File::open(archive_path)?;
  let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));

  for entry in archive.entries()? {
    let mut entry = entry?;
    let path = entry.path()?.into_owned();

    let stripped: PathBuf = path.components().skip(1).collect();
    if stripped.as_os_str().is_empty() {
      continue;
    }
    if stripped.components().any(|c| !matches!(c, Component::Normal(_))) {
      continue;
    }

    let dest_path = dest.join(&stripped);
    if let Some(parent) = dest_path.parent() {
      fs::create_dir_all(parent)?;
    }
    entry.unpack(&dest_path)?;
  }

  info!(archive = ?archive_path, dest = ?dest, "unpacked source archive");
  Ok(dest.to_path_buf())
}
