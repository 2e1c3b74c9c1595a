//! Compiler driver names handed to the native build.
//!
//! The resolver only ever sees a [`Compilers`] value. Looking the names up in
//! the process environment is the caller's job (see [`Compilers::from_lookup`]).

use serde::{Deserialize, Serialize};

use crate::deps::{Dependency, DependencyTable};

pub const DEFAULT_CC: &str = "cc";
pub const DEFAULT_FC: &str = "gfortran";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compilers {
  pub cc: String,
  pub fc: String,
  pub mpicc: Option<String>,
  pub mpifc: Option<String>,
}

impl Default for Compilers {
  fn default() -> Self {
    Self {
      cc: DEFAULT_CC.to_string(),
      fc: DEFAULT_FC.to_string(),
      mpicc: None,
      mpifc: None,
    }
  }
}

impl Compilers {
  pub fn new(cc: &str, fc: &str) -> Self {
    Self {
      cc: cc.to_string(),
      fc: fc.to_string(),
      mpicc: None,
      mpifc: None,
    }
  }

  pub fn with_mpi(mut self, mpicc: &str, mpifc: &str) -> Self {
    self.mpicc = Some(mpicc.to_string());
    self.mpifc = Some(mpifc.to_string());
    self
  }

  /// Build the compiler set from a variable lookup (`CC`, `FC`, `MPICC`, `MPIFC`).
  ///
  /// Unset MPI wrappers fall back to `<open-mpi>/bin/mpicc` and
  /// `<open-mpi>/bin/mpif90` when the open-mpi location is known.
  pub fn from_lookup<F>(lookup: F, deps: &DependencyTable) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let wrapper = |name: &str| {
      deps
        .get(Dependency::OpenMpi)
        .map(|loc| loc.bin_dir().join(name).display().to_string())
    };

    Self {
      cc: non_empty("CC").unwrap_or_else(|| DEFAULT_CC.to_string()),
      fc: non_empty("FC").unwrap_or_else(|| DEFAULT_FC.to_string()),
      mpicc: non_empty("MPICC").or_else(|| wrapper("mpicc")),
      mpifc: non_empty("MPIFC").or_else(|| wrapper("mpif90")),
    }
  }
}
