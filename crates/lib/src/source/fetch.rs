//! Download with mirror fallback and SHA-1 verification.

use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tokio::fs;
use tracing::{debug, info, warn};

use super::{SourceError, SourceSpec};

/// Fetch the archive described by `spec` into `cache_dir`.
///
/// A cached archive with the right checksum is reused. Otherwise each URL is
/// tried in turn; the checksum is verified before anything is written.
pub async fn fetch(spec: &SourceSpec, cache_dir: &Path) -> Result<PathBuf, SourceError> {
  fs::create_dir_all(cache_dir).await?;
  let dest_path = cache_dir.join(spec.archive_name());

  if dest_path.exists() {
    debug!(path = ?dest_path, "checking cached archive");
    match sha1_file(&dest_path).await {
      Ok(actual) if actual == spec.sha1 => {
        info!(path = ?dest_path, "using cached archive");
        return Ok(dest_path);
      }
      Ok(actual) => debug!(expected = %spec.sha1, actual = %actual, "cached archive hash mismatch, re-downloading"),
      Err(e) => debug!(error = %e, "could not read cached archive, re-downloading"),
    }
  }

  let mut last_error = None;
  for url in spec.urls() {
    match download(url, spec.sha1).await {
      Ok(bytes) => {
        // Write to a sibling file first so an interrupted write never looks cached.
        let partial = dest_path.with_extension("part");
        fs::write(&partial, &bytes).await?;
        fs::rename(&partial, &dest_path).await?;
        info!(url = %url, path = ?dest_path, "downloaded source archive");
        return Ok(dest_path);
      }
      Err(e) => {
        warn!(url = %url, error = %e, "download failed");
        last_error = Some(e);
      }
    }
  }

  Err(last_error.unwrap_or_else(|| SourceError::FetchFailed {
    url: spec.url.to_string(),
    message: "no download URL".to_string(),
  }))
}

async fn download(url: &str, expected_sha1: &str) -> Result<Vec<u8>, SourceError> {
  info!(url = %url, "fetching URL");

  let failed = |message: String| SourceError::FetchFailed {
    url: url.to_string(),
    message,
  };

  let response = reqwest::get(url).await.map_err(|e| failed(e.to_string()))?;
  if !response.status().is_success() {
    return Err(failed(format!("HTTP {}", response.status())));
  }
  let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

  let actual = sha1_hex(&bytes);
  if actual != expected_sha1 {
    return Err(SourceError::HashMismatch {
      url: url.to_string(),
      expected: expected_sha1.to_string(),
      actual,
    });
  }
  debug!(sha1 = %actual, "hash verified");

  Ok(bytes.to_vec())
}

pub fn sha1_hex(bytes: &[u8]) -> String {
  let mut hasher = Sha1::new();
  hasher.update(bytes);
  hex::encode(hasher.finalize())
}

pub async fn sha1_file(path: &Path) -> Result<String, std::io::Error> {
  let bytes = fs::read(path).await?;
  Ok(sha1_hex(&bytes))
}
