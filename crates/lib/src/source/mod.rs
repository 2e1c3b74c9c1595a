//! Upstream source archive: where to get it and how to check it.

mod archive;
mod fetch;

pub use archive::unpack;
pub use fetch::{fetch, sha1_file, sha1_hex};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::consts::MUMPS_VERSION;

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("fetch failed for {url}: {message}")]
  FetchFailed { url: String, message: String },

  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  #[error("unsupported archive format: {0}")]
  UnsupportedArchive(PathBuf),

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// A source tarball with an optional mirror and its SHA-1 checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
  pub version: &'static str,
  pub url: &'static str,
  pub mirror: Option<&'static str>,
  pub sha1: &'static str,
}

/// The MUMPS release built by this recipe.
pub const MUMPS: SourceSpec = SourceSpec {
  version: MUMPS_VERSION,
  url: "http://mumps.enseeiht.fr/MUMPS_4.10.0.tar.gz",
  mirror: Some("http://graal.ens-lyon.fr/MUMPS/MUMPS_4.10.0.tar.gz"),
  sha1: "904b1d816272d99f1f53913cbd4789a5be1838f7",
};

impl SourceSpec {
  /// Primary URL first, then the mirror.
  pub fn urls(&self) -> impl Iterator<Item = &'static str> {
    std::iter::once(self.url).chain(self.mirror)
  }

  /// File name of the archive, taken from the last URL segment.
  pub fn archive_name(&self) -> &'static str {
    self.url.rsplit('/').next().unwrap_or(self.url)
  }
}
