//! Types produced and consumed by the build option resolver.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::args::BuildArgs;
use crate::compilers::Compilers;
use crate::deps::{Dependency, DependencyTable};
use crate::platform::Os;
use crate::toggles::{Feature, Toggles};

/// Base `Makefile.inc` the build starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
  Parallel,
  Sequential,
}

impl Template {
  pub fn for_mpi(mpi: bool) -> Self {
    if mpi { Template::Parallel } else { Template::Sequential }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Parallel => "parallel",
      Self::Sequential => "sequential",
    }
  }

  pub fn is_parallel(&self) -> bool {
    matches!(self, Self::Parallel)
  }

  /// File name inside the source tree's `Make.inc/` directory.
  pub fn makefile(&self) -> &'static str {
    match self {
      Self::Parallel => "Makefile.gfortran.PAR",
      Self::Sequential => "Makefile.gfortran.SEQ",
    }
  }
}

impl fmt::Display for Template {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// Configuration errors. Resolution is all-or-nothing, so none of these come
/// with a partial argument list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  #[error("{feature} is enabled but no location was supplied for dependency '{dependency}'")]
  MissingDependency { feature: Feature, dependency: Dependency },

  #[error("{feature} is enabled but no {variable} compiler wrapper was supplied")]
  MissingCompiler { feature: Feature, variable: &'static str },

  #[error("build argument {0} was set twice")]
  DuplicateArgument(String),
}

/// Everything the resolver looks at. Nothing else is consulted.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInput<'a> {
  pub toggles: &'a Toggles,
  pub deps: &'a DependencyTable,
  pub compilers: &'a Compilers,
  pub os: Os,
  /// Final library directory, embedded into macOS install names.
  pub lib_dir: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
  pub template: Template,
  pub args: BuildArgs,
}
