//! Dependency location table.
//!
//! Maps each external dependency to where it is installed. Locations are
//! supplied by the environment (CLI flags or a JSON file) and are read-only
//! once resolution starts.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External packages the recipe can link against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dependency {
  Scotch5,
  Metis4,
  Openblas,
  Scalapack,
  OpenMpi,
}

impl Dependency {
  pub const ALL: [Dependency; 5] = [
    Dependency::Scotch5,
    Dependency::Metis4,
    Dependency::Openblas,
    Dependency::Scalapack,
    Dependency::OpenMpi,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Scotch5 => "scotch5",
      Self::Metis4 => "metis4",
      Self::Openblas => "openblas",
      Self::Scalapack => "scalapack",
      Self::OpenMpi => "open-mpi",
    }
  }
}

impl fmt::Display for Dependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Dependency {
  type Err = DepsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Dependency::ALL
      .into_iter()
      .find(|d| d.as_str() == s)
      .ok_or_else(|| DepsError::UnknownDependency(s.to_string()))
  }
}

#[derive(Debug, Error)]
pub enum DepsError {
  #[error("unknown dependency '{0}' (expected one of: scotch5, metis4, openblas, scalapack, open-mpi)")]
  UnknownDependency(String),

  #[error("invalid dependency assignment '{0}', expected NAME=PREFIX")]
  InvalidAssignment(String),

  #[error("failed to read dependency file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse dependency file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Where one dependency is installed.
///
/// `lib` and `include` default to `<prefix>/lib` and `<prefix>/include`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyLocation {
  pub prefix: PathBuf,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lib: Option<PathBuf>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub include: Option<PathBuf>,
}

impl DependencyLocation {
  pub fn new(prefix: impl Into<PathBuf>) -> Self {
    Self {
      prefix: prefix.into(),
      lib: None,
      include: None,
    }
  }

  pub fn with_lib(mut self, lib: impl Into<PathBuf>) -> Self {
    self.lib = Some(lib.into());
    self
  }

  pub fn with_include(mut self, include: impl Into<PathBuf>) -> Self {
    self.include = Some(include.into());
    self
  }

  pub fn lib_dir(&self) -> PathBuf {
    self.lib.clone().unwrap_or_else(|| self.prefix.join("lib"))
  }

  pub fn include_dir(&self) -> PathBuf {
    self.include.clone().unwrap_or_else(|| self.prefix.join("include"))
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.prefix.join("bin")
  }
}

/// Read-only table of dependency locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyTable {
  entries: BTreeMap<Dependency, DependencyLocation>,
}

impl DependencyTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, dependency: Dependency, location: DependencyLocation) -> Self {
    self.entries.insert(dependency, location);
    self
  }

  pub fn get(&self, dependency: Dependency) -> Option<&DependencyLocation> {
    self.entries.get(&dependency)
  }

  pub fn contains(&self, dependency: Dependency) -> bool {
    self.entries.contains_key(&dependency)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (Dependency, &DependencyLocation)> {
    self.entries.iter().map(|(d, l)| (*d, l))
  }

  /// Entries of `other` replace entries of `self` for the same dependency.
  pub fn merged(mut self, other: DependencyTable) -> Self {
    self.entries.extend(other.entries);
    self
  }

  /// Parse a JSON table of the form `{ "metis4": { "prefix": "/opt/metis4" } }`.
  pub fn from_json(path: &Path, content: &str) -> Result<Self, DepsError> {
    serde_json::from_str(content).map_err(|source| DepsError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn load(path: &Path) -> Result<Self, DepsError> {
    let content = fs::read_to_string(path).map_err(|source| DepsError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(path, &content)
  }

  /// Parse a `NAME=PREFIX` assignment as given on the command line.
  pub fn parse_assignment(assignment: &str) -> Result<(Dependency, DependencyLocation), DepsError> {
    let (name, prefix) = assignment
      .split_once('=')
      .ok_or_else(|| DepsError::InvalidAssignment(assignment.to_string()))?;
    if prefix.is_empty() {
      return Err(DepsError::InvalidAssignment(assignment.to_string()));
    }
    let dependency = name.trim().parse()?;
    Ok((dependency, DependencyLocation::new(prefix)))
  }

  pub fn from_assignments<'a>(assignments: impl IntoIterator<Item = &'a str>) -> Result<Self, DepsError> {
    assignments.into_iter().try_fold(Self::new(), |table, assignment| {
      let (dependency, location) = Self::parse_assignment(assignment)?;
      Ok(table.with(dependency, location))
    })
  }
}
