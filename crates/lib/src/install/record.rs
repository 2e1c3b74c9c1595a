//! The persisted record of how an installation was configured.
//!
//! Three files land in the prefix: the `Makefile.inc` that was used, the make
//! arguments as a single space-separated line, and a JSON document that later
//! commands (`mumps test`) read back.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{InstallError, InstallLayout, io_err};
use crate::build::MAKEFILE_INC;
use crate::consts::MUMPS_VERSION;
use crate::resolve::{Resolution, Template};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRecord {
  pub version: String,
  pub template: Template,
  pub makefile: String,
  pub arguments: Vec<String>,
}

impl From<&Resolution> for ResolutionRecord {
  fn from(resolution: &Resolution) -> Self {
    Self {
      version: MUMPS_VERSION.to_string(),
      template: resolution.template,
      makefile: resolution.template.makefile().to_string(),
      arguments: resolution.args.to_make_args(),
    }
  }
}

pub fn write_record(source_dir: &Path, layout: &InstallLayout, resolution: &Resolution) -> Result<(), InstallError> {
  fs::create_dir_all(layout.prefix()).map_err(io_err(layout.prefix()))?;

  let makefile = source_dir.join(MAKEFILE_INC);
  let makefile_dest = layout.makefile_record();
  fs::copy(&makefile, &makefile_dest).map_err(io_err(&makefile))?;

  let args_path = layout.make_args_record();
  fs::write(&args_path, format!("{}\n", resolution.args)).map_err(io_err(&args_path))?;

  let record_path = layout.resolution_record();
  let json = serde_json::to_string_pretty(&ResolutionRecord::from(resolution))?;
  fs::write(&record_path, json).map_err(io_err(&record_path))?;

  debug!(prefix = ?layout.prefix(), "wrote build record");
  Ok(())
}

pub fn read_record(layout: &InstallLayout) -> Result<ResolutionRecord, InstallError> {
  let path = layout.resolution_record();
  if !path.is_file() {
    return Err(InstallError::Missing(path));
  }
  let content = fs::read_to_string(&path).map_err(io_err(&path))?;
  Ok(serde_json::from_str(&content)?)
}

/// Post-install notes for the user, if any.
pub fn caveats(template: Template, layout: &InstallLayout) -> Option<String> {
  match template {
    Template::Parallel => None,
    Template::Sequential => Some(format!(
      "You built a sequential MUMPS library.\n\
       Please add {} to the include path\n\
       when building software that depends on MUMPS.",
      layout.libexec_include().display()
    )),
  }
}
