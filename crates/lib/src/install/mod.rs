//! Installation of the built tree into a prefix.
//!
//! Parallel builds install their headers directly. Sequential builds keep
//! headers in `libexec/include` and only symlink the MUMPS headers into
//! `include`: the MPI stub headers from `libseq/` would clash with a real MPI.

mod layout;
mod record;

pub use layout::{InstallLayout, MAKE_ARGS_FILE, RESOLUTION_FILE};
pub use record::{ResolutionRecord, caveats, read_record, write_record};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::platform::Os;
use crate::resolve::Template;

#[derive(Debug, Error)]
pub enum InstallError {
  #[error("expected build output is missing: {0}")]
  Missing(PathBuf),

  #[error("io error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid build record: {0}")]
  Record(#[from] serde_json::Error),
}

pub(crate) fn io_err(path: &Path) -> impl FnOnce(io::Error) -> InstallError + '_ {
  move |source| InstallError::Io {
    path: path.to_path_buf(),
    source,
  }
}

/// Paths created in the prefix, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstalledFiles {
  pub libraries: Vec<PathBuf>,
  pub headers: Vec<PathBuf>,
  pub docs: Vec<PathBuf>,
  pub examples: Vec<PathBuf>,
}

/// Install libraries, headers, docs and examples from a finished build tree.
pub fn install_tree(
  source_dir: &Path,
  layout: &InstallLayout,
  template: Template,
  os: Os,
) -> Result<InstalledFiles, InstallError> {
  let mut installed = InstalledFiles {
    libraries: install_contents(&source_dir.join("lib"), &layout.lib(), Required::Yes, |_| true)?,
    ..Default::default()
  };

  let include = source_dir.join("include");
  match template {
    Template::Parallel => {
      installed.headers = install_contents(&include, &layout.include(), Required::Yes, |_| true)?;
    }
    Template::Sequential => {
      let libseq = source_dir.join("libseq");
      let stub = libseq.join(format!("libmpiseq{}", os.shared_lib_ext()));
      if !stub.is_file() {
        return Err(InstallError::Missing(stub));
      }
      let lib_dir = layout.lib();
      fs::create_dir_all(&lib_dir).map_err(io_err(&lib_dir))?;
      installed.libraries.push(copy_into(&stub, &lib_dir)?);

      let private = layout.libexec_include();
      let headers = install_contents(&include, &private, Required::Yes, |_| true)?;
      installed.headers = link_all(&headers, &layout.include())?;

      let stubs = install_contents(&libseq, &private, Required::No, |p| has_extension(p, "h"))?;
      debug!(count = stubs.len(), "installed MPI stub headers without links");
    }
  }

  installed.docs = install_contents(&source_dir.join("doc"), &layout.doc(), Required::No, |p| {
    has_extension(p, "pdf")
  })?;
  installed.examples = install_contents(
    &source_dir.join("examples"),
    &layout.examples(),
    Required::No,
    |p| !has_extension(p, "o"),
  )?;

  info!(
    prefix = ?layout.prefix(),
    libraries = installed.libraries.len(),
    headers = installed.headers.len(),
    "installed build tree"
  );
  Ok(installed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Required {
  Yes,
  No,
}

fn has_extension(path: &Path, ext: &str) -> bool {
  path.extension().is_some_and(|e| e == ext)
}

/// Copy the top-level entries of `src` accepted by `filter` into `dest`.
///
/// Entries are processed in name order. Returns the destination paths.
fn install_contents<F>(src: &Path, dest: &Path, required: Required, filter: F) -> Result<Vec<PathBuf>, InstallError>
where
  F: Fn(&Path) -> bool,
{
  if !src.is_dir() {
    return match required {
      Required::Yes => Err(InstallError::Missing(src.to_path_buf())),
      Required::No => Ok(Vec::new()),
    };
  }

  let mut entries = fs::read_dir(src)
    .map_err(io_err(src))?
    .map(|entry| entry.map(|e| e.path()))
    .collect::<Result<Vec<_>, _>>()
    .map_err(io_err(src))?;
  entries.sort();

  fs::create_dir_all(dest).map_err(io_err(dest))?;

  entries
    .iter()
    .filter(|path| filter(path))
    .map(|path| copy_into(path, dest))
    .collect()
}

/// Copy a file or a whole directory into `dest_dir`, keeping its name.
fn copy_into(src: &Path, dest_dir: &Path) -> Result<PathBuf, InstallError> {
  let name = src.file_name().ok_or_else(|| InstallError::Missing(src.to_path_buf()))?;
  let target = dest_dir.join(name);

  if src.is_dir() {
    for entry in WalkDir::new(src) {
      let entry = entry.map_err(|e| InstallError::Io {
        path: src.to_path_buf(),
        source: io::Error::from(e),
      })?;
      let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
      let out = target.join(relative);
      unlink_symlink(&out)?;
      if entry.file_type().is_dir() {
        fs::create_dir_all(&out).map_err(io_err(&out))?;
      } else {
        fs::copy(entry.path(), &out).map_err(io_err(entry.path()))?;
      }
    }
  } else {
    unlink_symlink(&target)?;
    fs::copy(src, &target).map_err(io_err(src))?;
  }

  Ok(target)
}

/// Symlink every path in `targets` into `link_dir`, replacing stale links.
fn link_all(targets: &[PathBuf], link_dir: &Path) -> Result<Vec<PathBuf>, InstallError> {
  fs::create_dir_all(link_dir).map_err(io_err(link_dir))?;

  let mut links = Vec::with_capacity(targets.len());
  for target in targets {
    let Some(name) = target.file_name() else {
      continue;
    };
    let link = link_dir.join(name);
    if fs::symlink_metadata(&link).is_ok() {
      remove_existing(&link)?;
    }
    symlink(target, &link).map_err(io_err(&link))?;
    links.push(link);
  }
  Ok(links)
}

/// `fs::copy` writes through symlinks, so links left by a sequential install
/// are removed before a real file takes their place.
fn unlink_symlink(path: &Path) -> Result<(), InstallError> {
  match fs::symlink_metadata(path) {
    Ok(meta) if meta.file_type().is_symlink() => fs::remove_file(path).map_err(io_err(path)),
    _ => Ok(()),
  }
}

fn remove_existing(path: &Path) -> Result<(), InstallError> {
  let is_dir = fs::symlink_metadata(path).map(|m| m.is_dir()).unwrap_or(false);
  let result = if is_dir {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  };
  result.map_err(io_err(path))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
  std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
  fs::copy(target, link).map(|_| ())
}
