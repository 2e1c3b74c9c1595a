use std::path::PathBuf;

use crate::consts::{APP_NAME, CACHE_DIR_ENV};

/// Returns the user's home directory, if known
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// Returns the directory used to cache downloaded source archives
///
/// `MUMPS_CACHE_DIR` wins, then `XDG_CACHE_HOME`, then `~/.cache`. Falls back
/// to the system temp directory when no home directory is set.
pub fn cache_dir() -> PathBuf {
  if let Some(path) = std::env::var_os(CACHE_DIR_ENV) {
    return PathBuf::from(path);
  }

  let cache_home = std::env::var_os("XDG_CACHE_HOME")
    .map(PathBuf::from)
    .or_else(|| home_dir().map(|home| home.join(".cache")))
    .unwrap_or_else(std::env::temp_dir);
  cache_home.join(APP_NAME)
}
