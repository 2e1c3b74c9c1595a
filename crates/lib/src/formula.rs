//! The recipe end to end.
//!
//! [`Recipe`] ties the pieces together: it applies the toggle gates that the
//! package declares, resolves make arguments, obtains the source, runs the
//! serial native build, installs into the prefix and records how it was done.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{info, warn};

use crate::build::{self, BuildError};
use crate::compilers::Compilers;
use crate::deps::DependencyTable;
use crate::exec::CommandRunner;
use crate::install::{self, InstallError, InstallLayout, InstalledFiles};
use crate::platform::Os;
use crate::resolve::{Resolution, ResolveError, ResolveInput, Template, resolve};
use crate::source::{self, SourceError};
use crate::toggles::{Feature, Toggle, Toggles};
use crate::verify::{self, VerifyError, VerifyReport};

#[derive(Debug, Error)]
pub enum FormulaError {
  #[error("configuration error: {0}")]
  Configuration(#[from] ResolveError),

  #[error("source error: {0}")]
  Source(#[from] SourceError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error("install error: {0}")]
  Install(#[from] InstallError),

  #[error("verification failed: {0}")]
  Verification(#[from] VerifyError),
}

/// Where the MUMPS sources come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
  /// An already unpacked source tree, built in place.
  Directory(PathBuf),
  /// A local `.tar.gz`.
  Archive(PathBuf),
  /// Download the upstream release into a cache directory.
  Download { cache_dir: PathBuf },
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
  pub prefix: PathBuf,
  pub template: Template,
  pub arguments: Vec<String>,
  pub installed: InstalledFiles,
  pub caveats: Option<String>,
}

/// One configured build of the library.
#[derive(Debug, Clone)]
pub struct Recipe {
  pub toggles: Toggles,
  pub deps: DependencyTable,
  pub compilers: Compilers,
  pub os: Os,
  pub prefix: PathBuf,
}

impl Recipe {
  pub fn layout(&self) -> InstallLayout {
    InstallLayout::new(&self.prefix)
  }

  /// Toggles after the package-level gates.
  ///
  /// METIS 4 is only offered for sequential builds, so it is dropped when MPI
  /// is on. The resolver itself does not enforce this.
  pub fn effective_toggles(&self) -> Toggles {
    if self.toggles.mpi() && self.toggles.get(Feature::Metis4) == Toggle::Enabled {
      warn!("metis4 is only available without MPI; ignoring --with-metis4");
      return self.toggles.clone().with(Feature::Metis4, Toggle::Unspecified);
    }
    self.toggles.clone()
  }

  pub fn resolve(&self) -> Result<Resolution, ResolveError> {
    let toggles = self.effective_toggles();
    let lib_dir = self.layout().lib();
    resolve(&ResolveInput {
      toggles: &toggles,
      deps: &self.deps,
      compilers: &self.compilers,
      os: self.os,
      lib_dir: &lib_dir,
    })
  }

  /// Resolve, build and install.
  ///
  /// Configuration problems are reported before anything is downloaded or built.
  pub async fn install<R: CommandRunner>(
    &self,
    runner: &R,
    source: &SourceLocation,
  ) -> Result<InstallReport, FormulaError> {
    let resolution = self.resolve()?;
    info!(template = %resolution.template, args = resolution.args.len(), "resolved build options");

    let (source_dir, _workdir) = obtain_source(source).await?;

    build::prepare(&source_dir, resolution.template)?;
    build::run_make(runner, &source_dir, &resolution).await?;

    let layout = self.layout();
    let installed = install::install_tree(&source_dir, &layout, resolution.template, self.os)?;
    install::write_record(&source_dir, &layout, &resolution)?;

    Ok(InstallReport {
      prefix: self.prefix.clone(),
      template: resolution.template,
      arguments: resolution.args.to_make_args(),
      installed,
      caveats: install::caveats(resolution.template, &layout),
    })
  }
}

/// Returns the source tree to build in, plus the scratch directory that must
/// stay alive while it is used.
async fn obtain_source(source: &SourceLocation) -> Result<(PathBuf, Option<TempDir>), SourceError> {
  match source {
    SourceLocation::Directory(dir) => Ok((dir.clone(), None)),
    SourceLocation::Archive(archive) => unpack_to_scratch(archive),
    SourceLocation::Download { cache_dir } => {
      let archive = source::fetch(&source::MUMPS, cache_dir).await?;
      unpack_to_scratch(&archive)
    }
  }
}

fn unpack_to_scratch(archive: &Path) -> Result<(PathBuf, Option<TempDir>), SourceError> {
  let scratch = tempfile::Builder::new().prefix("mumps-build-").tempdir()?;
  let source_dir = source::unpack(archive, &scratch.path().join("src"))?;
  Ok((source_dir, Some(scratch)))
}

/// Verify an installed prefix using the template recorded at install time.
pub async fn test<R: CommandRunner>(runner: &R, prefix: &Path) -> Result<VerifyReport, FormulaError> {
  let layout = InstallLayout::new(prefix);
  let record = install::read_record(&layout)?;
  info!(template = %record.template, prefix = ?prefix, "verifying installation");
  Ok(verify::verify(runner, &layout, record.template, &verify::default_programs()).await?)
}
