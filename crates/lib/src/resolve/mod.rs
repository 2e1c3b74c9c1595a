//! Build option resolver.
//!
//! Turns toggles, dependency locations and compiler names into the template
//! selection and the ordered make arguments for the native MUMPS build. This
//! is a pure function: no I/O, no environment lookups.

mod args;
mod types;

pub use args::{BuildArg, BuildArgs};
pub use types::{Resolution, ResolveError, ResolveInput, Template};

use crate::deps::{Dependency, DependencyLocation};
use crate::toggles::Feature;

/// Ordering method that is always compiled in.
pub const DEFAULT_ORDERING: &str = "-Dpord";

/// Link names used when no custom BLAS/LAPACK is requested.
pub const DEFAULT_LIBBLAS: &str = "-lblas -llapack";

/// Link name used for ScaLAPACK when it was not built against a custom BLAS.
pub const DEFAULT_SCALAP: &str = "-lscalapack";

/// Scotch link flags. Both expand `$(SCOTCHDIR)`, so they must follow it.
pub const PARALLEL_LSCOTCH: &str = "-L$(SCOTCHDIR)/lib -lptesmumps -lptscotch -lptscotcherr";
pub const SEQUENTIAL_LSCOTCH: &str = "-L$(SCOTCHDIR) -lesmumps -lscotch -lscotcherr";

/// Accumulates the `ORDERINGSF` value. There is exactly one of these per
/// resolution, so enabling several orderings never produces duplicate keys.
#[derive(Debug)]
struct OrderingFlags(String);

impl OrderingFlags {
  fn new() -> Self {
    Self(DEFAULT_ORDERING.to_string())
  }

  fn add(&mut self, flag: &str) {
    self.0.push(' ');
    self.0.push_str(flag);
  }

  fn finish(self) -> String {
    self.0
  }
}

struct MpiInputs<'a> {
  mpicc: &'a str,
  mpifc: &'a str,
  open_mpi: &'a DependencyLocation,
  scalapack: Option<&'a DependencyLocation>,
}

/// Inputs that must be present for the requested toggles, checked before any
/// argument is produced.
struct Required<'a> {
  scotch: Option<&'a DependencyLocation>,
  metis: Option<&'a DependencyLocation>,
  openblas: Option<&'a DependencyLocation>,
  mpi: Option<MpiInputs<'a>>,
}

fn require<'a>(
  input: &ResolveInput<'a>,
  feature: Feature,
  dependency: Dependency,
) -> Result<&'a DependencyLocation, ResolveError> {
  input
    .deps
    .get(dependency)
    .ok_or(ResolveError::MissingDependency { feature, dependency })
}

fn require_if<'a>(
  input: &ResolveInput<'a>,
  feature: Feature,
  dependency: Dependency,
) -> Result<Option<&'a DependencyLocation>, ResolveError> {
  if input.toggles.is_enabled(feature) {
    require(input, feature, dependency).map(Some)
  } else {
    Ok(None)
  }
}

fn check_requirements<'a>(input: &ResolveInput<'a>) -> Result<Required<'a>, ResolveError> {
  let scotch = require_if(input, Feature::Scotch5, Dependency::Scotch5)?;
  let metis = require_if(input, Feature::Metis4, Dependency::Metis4)?;

  let mpi = if input.toggles.mpi() {
    let compilers = input.compilers;
    let mpicc = compilers.mpicc.as_deref().ok_or(ResolveError::MissingCompiler {
      feature: Feature::Mpi,
      variable: "MPICC",
    })?;
    let mpifc = compilers.mpifc.as_deref().ok_or(ResolveError::MissingCompiler {
      feature: Feature::Mpi,
      variable: "MPIFC",
    })?;
    let open_mpi = require(input, Feature::Mpi, Dependency::OpenMpi)?;
    // ScaLAPACK must come from a known prefix when it was built against a custom BLAS.
    let scalapack = if input.toggles.is_enabled(Feature::Openblas) {
      Some(require(input, Feature::Openblas, Dependency::Scalapack)?)
    } else {
      None
    };
    Some(MpiInputs {
      mpicc,
      mpifc,
      open_mpi,
      scalapack,
    })
  } else {
    None
  };

  let openblas = require_if(input, Feature::Openblas, Dependency::Openblas)?;

  Ok(Required {
    scotch,
    metis,
    openblas,
    mpi,
  })
}

/// Resolve the template and make arguments for one build.
///
/// Fails with a [`ResolveError`] when a toggle needs a dependency location or
/// compiler wrapper that was not supplied. Calling this twice with the same
/// input yields identical results.
pub fn resolve(input: &ResolveInput<'_>) -> Result<Resolution, ResolveError> {
  let required = check_requirements(input)?;
  let template = Template::for_mpi(required.mpi.is_some());

  let mut args = BuildArgs::new();
  args.push("LIBEXT", input.os.shared_lib_ext())?;
  args.push("AR", input.os.shared_archiver(input.lib_dir))?;
  args.push("RANLIB", "echo")?;

  let mut orderings = OrderingFlags::new();

  if let Some(scotch) = required.scotch {
    args.push("SCOTCHDIR", scotch.prefix.display().to_string())?;
    args.push("ISCOTCH", format!("-I{}", scotch.include_dir().display()))?;
    if template.is_parallel() {
      args.push("LSCOTCH", PARALLEL_LSCOTCH)?;
      orderings.add("-Dptscotch");
    } else {
      args.push("LSCOTCH", SEQUENTIAL_LSCOTCH)?;
      orderings.add("-Dscotch");
    }
  }

  if let Some(metis) = required.metis {
    let lib_dir = metis.lib_dir();
    args.push("LMETISDIR", lib_dir.display().to_string())?;
    args.push("IMETIS", metis.include_dir().display().to_string())?;
    args.push("LMETIS", format!("-L{} -lmetis", lib_dir.display()))?;
    orderings.add("-Dmetis");
  }

  args.push("ORDERINGSF", orderings.finish())?;

  match &required.mpi {
    Some(mpi) => {
      args.push("CC", format!("{} -fPIC", mpi.mpicc))?;
      args.push("FC", format!("{} -fPIC", mpi.mpifc))?;
      args.push("FL", format!("{} -fPIC", mpi.mpifc))?;
      let scalap = match mpi.scalapack {
        Some(scalapack) => format!("-L{} -lscalapack", scalapack.lib_dir().display()),
        None => DEFAULT_SCALAP.to_string(),
      };
      args.push("SCALAP", scalap)?;
      args.push("INCPAR", format!("-I{}", mpi.open_mpi.include_dir().display()))?;
      args.push(
        "LIBPAR",
        format!("$(SCALAP) -L{} -lmpi -lmpi_mpifh", mpi.open_mpi.lib_dir().display()),
      )?;
    }
    None => {
      args.push("CC", format!("{} -fPIC", input.compilers.cc))?;
      args.push("FC", format!("{} -fPIC", input.compilers.fc))?;
      args.push("FL", format!("{} -fPIC", input.compilers.fc))?;
    }
  }

  match required.openblas {
    Some(openblas) => args.push("LIBBLAS", format!("-L{} -lopenblas", openblas.lib_dir().display()))?,
    None => args.push("LIBBLAS", DEFAULT_LIBBLAS)?,
  }

  Ok(Resolution { template, args })
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;
  use std::path::Path;

  use super::*;
  use crate::compilers::Compilers;
  use crate::deps::DependencyTable;
  use crate::platform::Os;
  use crate::toggles::{Toggle, Toggles};

  const LIB_DIR: &str = "/usr/local/Cellar/mumps/4.10.0/lib";

  fn all_deps() -> DependencyTable {
    DependencyTable::new()
      .with(Dependency::Scotch5, DependencyLocation::new("/opt/scotch5"))
      .with(Dependency::Metis4, DependencyLocation::new("/opt/metis4"))
      .with(Dependency::Openblas, DependencyLocation::new("/opt/openblas"))
      .with(Dependency::Scalapack, DependencyLocation::new("/opt/scalapack"))
      .with(Dependency::OpenMpi, DependencyLocation::new("/opt/open-mpi"))
  }

  fn mpi_compilers() -> Compilers {
    Compilers::new("clang", "gfortran").with_mpi("mpicc", "mpif90")
  }

  fn run(toggles: &Toggles, deps: &DependencyTable, compilers: &Compilers) -> Result<Resolution, ResolveError> {
    resolve(&ResolveInput {
      toggles,
      deps,
      compilers,
      os: Os::MacOs,
      lib_dir: Path::new(LIB_DIR),
    })
  }

  fn toggle(on: bool) -> Toggle {
    if on { Toggle::Enabled } else { Toggle::Disabled }
  }

  /// All 16 explicit combinations of the four toggles.
  fn every_combination() -> Vec<Toggles> {
    (0..16u8)
      .map(|bits| {
        Toggles::new()
          .with(Feature::Mpi, toggle(bits & 1 != 0))
          .with(Feature::Scotch5, toggle(bits & 2 != 0))
          .with(Feature::Metis4, toggle(bits & 4 != 0))
          .with(Feature::Openblas, toggle(bits & 8 != 0))
      })
      .collect()
  }

  #[test]
  fn sequential_metis_scenario() {
    let toggles = Toggles::new()
      .disable(Feature::Mpi)
      .disable(Feature::Scotch5)
      .enable(Feature::Metis4)
      .disable(Feature::Openblas);
    let deps = DependencyTable::new().with(Dependency::Metis4, DependencyLocation::new("/opt/metis4"));

    let resolution = run(&toggles, &deps, &Compilers::new("cc", "gfortran")).unwrap();

    assert_eq!(resolution.template, Template::Sequential);
    assert_eq!(
      resolution.args.to_make_args(),
      vec![
        "LIBEXT=.dylib".to_string(),
        format!(
          "AR=$(FL) -shared -Wl,-install_name -Wl,{}/$(notdir $@) -undefined dynamic_lookup -o ",
          LIB_DIR
        ),
        "RANLIB=echo".to_string(),
        "LMETISDIR=/opt/metis4/lib".to_string(),
        "IMETIS=/opt/metis4/include".to_string(),
        "LMETIS=-L/opt/metis4/lib -lmetis".to_string(),
        "ORDERINGSF=-Dpord -Dmetis".to_string(),
        "CC=cc -fPIC".to_string(),
        "FC=gfortran -fPIC".to_string(),
        "FL=gfortran -fPIC".to_string(),
        "LIBBLAS=-lblas -llapack".to_string(),
      ]
    );
  }

  #[test]
  fn parallel_scotch_openblas_scenario() {
    let toggles = Toggles::new()
      .enable(Feature::Mpi)
      .enable(Feature::Scotch5)
      .enable(Feature::Openblas);

    let resolution = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
    let args = &resolution.args;

    assert_eq!(resolution.template, Template::Parallel);
    assert_eq!(args.get("ORDERINGSF"), Some("-Dpord -Dptscotch"));
    assert_eq!(args.get("SCOTCHDIR"), Some("/opt/scotch5"));
    assert_eq!(args.get("ISCOTCH"), Some("-I/opt/scotch5/include"));
    assert_eq!(
      args.get("LSCOTCH"),
      Some("-L$(SCOTCHDIR)/lib -lptesmumps -lptscotch -lptscotcherr")
    );
    assert_eq!(args.get("SCALAP"), Some("-L/opt/scalapack/lib -lscalapack"));
    assert_eq!(args.get("CC"), Some("mpicc -fPIC"));
    assert_eq!(args.get("FC"), Some("mpif90 -fPIC"));
    assert_eq!(args.get("FL"), Some("mpif90 -fPIC"));
    assert_eq!(args.get("INCPAR"), Some("-I/opt/open-mpi/include"));
    assert_eq!(
      args.get("LIBPAR"),
      Some("$(SCALAP) -L/opt/open-mpi/lib -lmpi -lmpi_mpifh")
    );
    assert_eq!(args.get("LIBBLAS"), Some("-L/opt/openblas/lib -lopenblas"));
    assert!(!args.contains_key("LMETIS"));
  }

  #[test]
  fn sequential_scotch_links_plain_libraries() {
    let toggles = Toggles::new().disable(Feature::Mpi).enable(Feature::Scotch5);
    let resolution = run(&toggles, &all_deps(), &Compilers::default()).unwrap();

    assert_eq!(
      resolution.args.get("LSCOTCH"),
      Some("-L$(SCOTCHDIR) -lesmumps -lscotch -lscotcherr")
    );
    assert_eq!(resolution.args.get("ORDERINGSF"), Some("-Dpord -Dscotch"));
  }

  #[test]
  fn scotch_link_flags_come_after_scotchdir() {
    for mpi in [true, false] {
      let toggles = if mpi {
        Toggles::new().enable(Feature::Mpi).enable(Feature::Scotch5)
      } else {
        Toggles::new().disable(Feature::Mpi).enable(Feature::Scotch5)
      };
      let resolution = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
      let keys: Vec<&str> = resolution.args.keys().collect();
      let dir = keys.iter().position(|k| *k == "SCOTCHDIR").unwrap();
      let link = keys.iter().position(|k| *k == "LSCOTCH").unwrap();

      assert!(dir < link);
      assert!(resolution.args.get("LSCOTCH").unwrap().starts_with("-L$(SCOTCHDIR)"));
      assert!(!resolution.args.get("LSCOTCH").unwrap().contains("/opt/scotch5"));
    }
  }

  #[test]
  fn template_follows_mpi_for_every_combination() {
    for toggles in every_combination() {
      let resolution = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
      let expected = if toggles.mpi() {
        Template::Parallel
      } else {
        Template::Sequential
      };
      assert_eq!(resolution.template, expected, "toggles: {:?}", toggles);
    }
  }

  #[test]
  fn both_orderings_concatenate_in_fixed_order() {
    for toggles in every_combination()
      .into_iter()
      .filter(|t| t.is_enabled(Feature::Scotch5) && t.is_enabled(Feature::Metis4))
    {
      let resolution = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
      let expected = if toggles.mpi() {
        "-Dpord -Dptscotch -Dmetis"
      } else {
        "-Dpord -Dscotch -Dmetis"
      };
      assert_eq!(resolution.args.get("ORDERINGSF"), Some(expected));
    }
  }

  #[test]
  fn default_blas_whenever_openblas_is_off() {
    for toggles in every_combination()
      .into_iter()
      .filter(|t| !t.is_enabled(Feature::Openblas))
    {
      let resolution = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
      assert_eq!(resolution.args.get("LIBBLAS"), Some(DEFAULT_LIBBLAS));
      assert!(!resolution.args.to_string().contains("/opt/openblas"));
      if toggles.mpi() {
        assert_eq!(resolution.args.get("SCALAP"), Some(DEFAULT_SCALAP));
      }
    }
  }

  #[test]
  fn keys_are_unique_for_every_combination() {
    for toggles in every_combination() {
      let resolution = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
      let keys: Vec<&str> = resolution.args.keys().collect();
      let unique: HashSet<&str> = keys.iter().copied().collect();
      assert_eq!(keys.len(), unique.len(), "duplicate key in {:?}", keys);
    }
  }

  #[test]
  fn sequential_build_has_no_parallel_algebra() {
    let toggles = Toggles::new().disable(Feature::Mpi).enable(Feature::Openblas);
    let resolution = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
    for key in ["SCALAP", "INCPAR", "LIBPAR"] {
      assert!(!resolution.args.contains_key(key), "{} should be absent", key);
    }
    assert_eq!(resolution.args.get("CC"), Some("clang -fPIC"));
  }

  #[test]
  fn resolution_is_idempotent() {
    let toggles = Toggles::new().enable(Feature::Scotch5).enable(Feature::Openblas);
    let first = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
    let second = run(&toggles, &all_deps(), &mpi_compilers()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.args.to_string(), second.args.to_string());
  }

  #[test]
  fn mpi_is_the_default() {
    let resolution = run(&Toggles::new(), &all_deps(), &mpi_compilers()).unwrap();
    assert_eq!(resolution.template, Template::Parallel);
    assert_eq!(resolution.args.get("ORDERINGSF"), Some(DEFAULT_ORDERING));
  }

  #[test]
  fn missing_mpi_compiler_is_a_configuration_error() {
    let err = run(&Toggles::new(), &all_deps(), &Compilers::default()).unwrap_err();
    assert_eq!(
      err,
      ResolveError::MissingCompiler {
        feature: Feature::Mpi,
        variable: "MPICC",
      }
    );
  }

  #[test]
  fn missing_open_mpi_location_is_a_configuration_error() {
    let err = run(&Toggles::new(), &DependencyTable::new(), &mpi_compilers()).unwrap_err();
    assert_eq!(
      err,
      ResolveError::MissingDependency {
        feature: Feature::Mpi,
        dependency: Dependency::OpenMpi,
      }
    );
  }

  #[test]
  fn missing_ordering_location_is_a_configuration_error() {
    let toggles = Toggles::new().disable(Feature::Mpi).enable(Feature::Scotch5);
    let err = run(&toggles, &DependencyTable::new(), &Compilers::default()).unwrap_err();
    assert_eq!(
      err,
      ResolveError::MissingDependency {
        feature: Feature::Scotch5,
        dependency: Dependency::Scotch5,
      }
    );
  }

  #[test]
  fn openblas_with_mpi_requires_scalapack_location() {
    let deps = DependencyTable::new()
      .with(Dependency::OpenMpi, DependencyLocation::new("/opt/open-mpi"))
      .with(Dependency::Openblas, DependencyLocation::new("/opt/openblas"));
    let toggles = Toggles::new().enable(Feature::Openblas);
    let err = run(&toggles, &deps, &mpi_compilers()).unwrap_err();
    assert_eq!(
      err,
      ResolveError::MissingDependency {
        feature: Feature::Openblas,
        dependency: Dependency::Scalapack,
      }
    );
  }

  #[test]
  fn linux_uses_shared_objects() {
    let toggles = Toggles::new().disable(Feature::Mpi);
    let resolution = resolve(&ResolveInput {
      toggles: &toggles,
      deps: &DependencyTable::new(),
      compilers: &Compilers::default(),
      os: Os::Linux,
      lib_dir: Path::new("/opt/mumps/lib"),
    })
    .unwrap();
    assert_eq!(resolution.args.get("LIBEXT"), Some(".so"));
    assert!(!resolution.args.get("AR").unwrap().contains("install_name"));
  }
}
