//! Recipe options shared by `resolve` and `install`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use mumps_lib::formula::Recipe;
use mumps_lib::platform::Os;
use mumps_lib::{Compilers, DependencyTable, Feature, Toggle, Toggles};

#[derive(Debug, Args)]
pub struct RecipeArgs {
  /// Build the parallel library with MPI (default)
  #[arg(long)]
  with_mpi: bool,

  /// Build the sequential library without MPI
  #[arg(long, conflicts_with = "with_mpi")]
  without_mpi: bool,

  /// Use the Scotch 5 ordering library
  #[arg(long)]
  with_scotch5: bool,

  #[arg(long, conflicts_with = "with_scotch5", hide = true)]
  without_scotch5: bool,

  /// Use the METIS 4 ordering library (sequential builds only)
  #[arg(long)]
  with_metis4: bool,

  #[arg(long, conflicts_with = "with_metis4", hide = true)]
  without_metis4: bool,

  /// Link against OpenBLAS instead of the system BLAS/LAPACK
  #[arg(long)]
  with_openblas: bool,

  #[arg(long, conflicts_with = "with_openblas", hide = true)]
  without_openblas: bool,

  /// Dependency location as NAME=PREFIX (repeatable)
  #[arg(long = "dep", value_name = "NAME=PREFIX")]
  deps: Vec<String>,

  /// JSON file mapping dependency names to locations
  #[arg(long = "deps", value_name = "FILE")]
  deps_file: Option<PathBuf>,
}

impl RecipeArgs {
  pub fn toggles(&self) -> Toggles {
    Toggles::new()
      .with(Feature::Mpi, Toggle::from_flags(self.with_mpi, self.without_mpi))
      .with(
        Feature::Scotch5,
        Toggle::from_flags(self.with_scotch5, self.without_scotch5),
      )
      .with(Feature::Metis4, Toggle::from_flags(self.with_metis4, self.without_metis4))
      .with(
        Feature::Openblas,
        Toggle::from_flags(self.with_openblas, self.without_openblas),
      )
  }

  /// Locations from `--deps` first, overridden by individual `--dep` flags.
  pub fn dependency_table(&self) -> Result<DependencyTable> {
    let from_file = match &self.deps_file {
      Some(path) => DependencyTable::load(path).context("Failed to load dependency file")?,
      None => DependencyTable::new(),
    };
    let from_flags = DependencyTable::from_assignments(self.deps.iter().map(String::as_str))
      .context("Invalid --dep argument")?;
    Ok(from_file.merged(from_flags))
  }

  /// Assemble the recipe, reading compiler names from the environment.
  pub fn recipe(&self, prefix: &Path) -> Result<Recipe> {
    let os = Os::current().context("Unsupported platform: only Linux and macOS are supported")?;
    let deps = self.dependency_table()?;
    let compilers = Compilers::from_lookup(|name| std::env::var(name).ok(), &deps);

    Ok(Recipe {
      toggles: self.toggles(),
      deps,
      compilers,
      os,
      prefix: prefix.to_path_buf(),
    })
  }
}
