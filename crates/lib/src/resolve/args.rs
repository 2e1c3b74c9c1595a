//! Ordered, duplicate-free `KEY=value` make arguments.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildArg {
  pub key: String,
  pub value: String,
}

impl fmt::Display for BuildArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}={}", self.key, self.value)
  }
}

/// Append-only list of make arguments.
///
/// Insertion order is preserved because later make variables may reference
/// earlier ones (`$(SCOTCHDIR)`, `$(SCALAP)`). A key can only be pushed once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildArgs(Vec<BuildArg>);

impl BuildArgs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), ResolveError> {
    let key = key.into();
    if self.contains_key(&key) {
      return Err(ResolveError::DuplicateArgument(key));
    }
    self.0.push(BuildArg {
      key,
      value: value.into(),
    });
    Ok(())
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.iter().find(|arg| arg.key == key).map(|arg| arg.value.as_str())
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.0.iter().any(|arg| arg.key == key)
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(|arg| arg.key.as_str())
  }

  pub fn iter(&self) -> std::slice::Iter<'_, BuildArg> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Arguments as passed on the make command line.
  pub fn to_make_args(&self) -> Vec<String> {
    self.0.iter().map(ToString::to_string).collect()
  }
}

impl<'a> IntoIterator for &'a BuildArgs {
  type Item = &'a BuildArg;
  type IntoIter = std::slice::Iter<'a, BuildArg>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Space-separated, the way the recipe records them in `make_args.txt`.
impl fmt::Display for BuildArgs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, arg) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str(" ")?;
      }
      write!(f, "{}", arg)?;
    }
    Ok(())
  }
}
