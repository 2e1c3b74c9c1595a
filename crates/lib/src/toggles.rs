//! Feature toggles accepted by the recipe.
//!
//! Every toggle is tri-state: explicitly enabled, explicitly disabled, or left
//! unspecified so that the feature default applies. MPI is recommended (on by
//! default); everything else is optional (off by default).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Optional features of the MUMPS build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
  Mpi,
  Scotch5,
  Metis4,
  Openblas,
}

/// How a feature behaves when the caller says nothing about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
  /// Enabled unless explicitly disabled.
  Recommended,
  /// Disabled unless explicitly enabled.
  Optional,
}

impl Feature {
  pub const ALL: [Feature; 4] = [Feature::Mpi, Feature::Scotch5, Feature::Metis4, Feature::Openblas];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Mpi => "mpi",
      Self::Scotch5 => "scotch5",
      Self::Metis4 => "metis4",
      Self::Openblas => "openblas",
    }
  }

  pub fn requirement(&self) -> Requirement {
    match self {
      Self::Mpi => Requirement::Recommended,
      _ => Requirement::Optional,
    }
  }

  pub fn default_enabled(&self) -> bool {
    self.requirement() == Requirement::Recommended
  }
}

impl fmt::Display for Feature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feature '{0}' (expected one of: mpi, scotch5, metis4, openblas)")]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
  type Err = UnknownFeature;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Feature::ALL
      .into_iter()
      .find(|f| f.as_str() == s)
      .ok_or_else(|| UnknownFeature(s.to_string()))
  }
}

/// Tri-state value of a single toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
  Enabled,
  Disabled,
  #[default]
  Unspecified,
}

impl Toggle {
  /// Build a toggle from a `--with-X` / `--without-X` flag pair.
  ///
  /// When both flags are set the explicit `without` wins; callers are expected
  /// to reject that combination before getting here.
  pub fn from_flags(with: bool, without: bool) -> Self {
    match (with, without) {
      (_, true) => Toggle::Disabled,
      (true, false) => Toggle::Enabled,
      (false, false) => Toggle::Unspecified,
    }
  }

  pub fn is_enabled_or(self, default: bool) -> bool {
    match self {
      Toggle::Enabled => true,
      Toggle::Disabled => false,
      Toggle::Unspecified => default,
    }
  }
}

/// The full toggle set for one invocation.
///
/// Built once up front with [`Toggles::with`]; there are no mutating setters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Toggles {
  values: BTreeMap<Feature, Toggle>,
}

impl Toggles {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, feature: Feature, toggle: Toggle) -> Self {
    if toggle == Toggle::Unspecified {
      self.values.remove(&feature);
    } else {
      self.values.insert(feature, toggle);
    }
    self
  }

  pub fn enable(self, feature: Feature) -> Self {
    self.with(feature, Toggle::Enabled)
  }

  pub fn disable(self, feature: Feature) -> Self {
    self.with(feature, Toggle::Disabled)
  }

  /// Raw tri-state value as given by the caller.
  pub fn get(&self, feature: Feature) -> Toggle {
    self.values.get(&feature).copied().unwrap_or_default()
  }

  /// Effective value after applying the feature default.
  pub fn is_enabled(&self, feature: Feature) -> bool {
    self.get(feature).is_enabled_or(feature.default_enabled())
  }

  pub fn mpi(&self) -> bool {
    self.is_enabled(Feature::Mpi)
  }

  /// Effective values for every known feature, in declaration order.
  pub fn effective(&self) -> Vec<(Feature, bool)> {
    Feature::ALL.into_iter().map(|f| (f, self.is_enabled(f))).collect()
  }
}
