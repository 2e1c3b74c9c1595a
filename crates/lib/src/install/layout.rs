use std::path::{Path, PathBuf};

use crate::consts::APP_NAME;

pub const MAKE_ARGS_FILE: &str = "make_args.txt";
pub const RESOLUTION_FILE: &str = "resolution.json";

/// Directory layout below an installation prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
  prefix: PathBuf,
}

impl InstallLayout {
  pub fn new(prefix: impl Into<PathBuf>) -> Self {
    Self { prefix: prefix.into() }
  }

  pub fn prefix(&self) -> &Path {
    &self.prefix
  }

  pub fn lib(&self) -> PathBuf {
    self.prefix.join("lib")
  }

  pub fn include(&self) -> PathBuf {
    self.prefix.join("include")
  }

  /// Private header directory of sequential builds.
  pub fn libexec_include(&self) -> PathBuf {
    self.prefix.join("libexec").join("include")
  }

  pub fn doc(&self) -> PathBuf {
    self.prefix.join("share").join("doc").join(APP_NAME)
  }

  pub fn examples(&self) -> PathBuf {
    self.prefix.join("share").join(APP_NAME).join("examples")
  }

  pub fn makefile_record(&self) -> PathBuf {
    self.prefix.join(crate::build::MAKEFILE_INC)
  }

  pub fn make_args_record(&self) -> PathBuf {
    self.prefix.join(MAKE_ARGS_FILE)
  }

  pub fn resolution_record(&self) -> PathBuf {
    self.prefix.join(RESOLUTION_FILE)
  }
}
