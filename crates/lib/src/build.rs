//! Delegation to the native Makefile build.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::exec::{CommandRunner, Invocation};
use crate::resolve::{Resolution, Template};

/// Name of the configuration file the MUMPS Makefiles include.
pub const MAKEFILE_INC: &str = "Makefile.inc";

/// Directory in the source tree holding the base templates.
pub const TEMPLATE_DIR: &str = "Make.inc";

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("template {0} not found in source tree")]
  MissingTemplate(PathBuf),

  #[error("native build failed with exit code {code:?}: {cmd}")]
  ExternalBuild { cmd: String, code: Option<i32> },

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// Copy the selected template to `Makefile.inc` at the top of the source tree.
pub fn prepare(source_dir: &Path, template: Template) -> Result<PathBuf, BuildError> {
  let template_path = source_dir.join(TEMPLATE_DIR).join(template.makefile());
  if !template_path.is_file() {
    return Err(BuildError::MissingTemplate(template_path));
  }

  let dest = source_dir.join(MAKEFILE_INC);
  fs::copy(&template_path, &dest)?;
  debug!(template = %template, path = ?dest, "prepared Makefile.inc");
  Ok(dest)
}

/// The `make all` invocation for a resolution.
///
/// `MAKEFLAGS=-j1` keeps the build serial: it is known to fail in parallel.
pub fn make_invocation(source_dir: &Path, resolution: &Resolution) -> Invocation {
  Invocation::new("make")
    .arg("all")
    .args(resolution.args.to_make_args())
    .current_dir(source_dir)
    .env("MAKEFLAGS", "-j1")
}

/// Run the native build. A non-zero exit is returned as is, without retry.
pub async fn run_make<R: CommandRunner>(
  runner: &R,
  source_dir: &Path,
  resolution: &Resolution,
) -> Result<(), BuildError> {
  let invocation = make_invocation(source_dir, resolution);
  info!(template = %resolution.template, "running native build");
  debug!(cmd = %invocation, "make invocation");

  let output = runner.run(&invocation).await?;
  if !output.stdout.is_empty() {
    debug!(stdout = %output.stdout.trim_end(), "make output");
  }

  if !output.success() {
    if !output.stderr.is_empty() {
      debug!(stderr = %output.stderr.trim_end(), "make stderr");
    }
    return Err(BuildError::ExternalBuild {
      cmd: invocation.to_string(),
      code: output.code,
    });
  }

  Ok(())
}
