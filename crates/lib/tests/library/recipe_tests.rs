//! End-to-end recipe tests with a simulated native build.

use std::fs;
use std::path::Path;

use mumps_lib::formula::{FormulaError, Recipe, SourceLocation, test as verify_prefix};
use mumps_lib::install::{InstallLayout, read_record};
use mumps_lib::platform::Os;
use mumps_lib::{Compilers, Dependency, DependencyLocation, DependencyTable, Feature, Template, Toggles};
use tempfile::TempDir;

use super::common::{FakeToolchain, source_tarball, source_tree};

fn sequential_recipe(prefix: &Path) -> Recipe {
  Recipe {
    toggles: Toggles::new().disable(Feature::Mpi).enable(Feature::Metis4),
    deps: DependencyTable::new().with(Dependency::Metis4, DependencyLocation::new("/opt/metis4")),
    compilers: Compilers::new("cc", "gfortran"),
    os: Os::Linux,
    prefix: prefix.to_path_buf(),
  }
}

#[tokio::test]
async fn sequential_install_records_arguments() {
  let temp = TempDir::new().unwrap();
  let src = source_tree(temp.path());
  let prefix = temp.path().join("prefix");
  let runner = FakeToolchain::new();

  let report = sequential_recipe(&prefix)
    .install(&runner, &SourceLocation::Directory(src.clone()))
    .await
    .unwrap();

  assert_eq!(report.template, Template::Sequential);
  assert!(report.caveats.unwrap().contains("libexec/include"));

  let calls = runner.calls();
  assert_eq!(calls.len(), 1);
  assert_eq!(calls[0].program, "make");
  assert_eq!(calls[0].args[0], "all");
  assert!(calls[0].args.contains(&"ORDERINGSF=-Dpord -Dmetis".to_string()));

  let layout = InstallLayout::new(&prefix);
  assert_eq!(fs::read_to_string(layout.makefile_record()).unwrap(), "# sequential\n");
  let make_args = fs::read_to_string(layout.make_args_record()).unwrap();
  assert!(make_args.starts_with("LIBEXT=.so "));
  assert!(make_args.contains("LMETIS=-L/opt/metis4/lib -lmetis"));
  assert!(make_args.ends_with("LIBBLAS=-lblas -llapack\n"));

  assert!(layout.lib().join("libmpiseq.so").is_file());
  assert!(layout.include().join("dmumps_c.h").exists());
  assert!(!layout.include().join("mpi.h").exists());
  assert!(layout.examples().join("dsimpletest").is_file());
  assert!(!layout.examples().join("dsimpletest.o").exists());

  let record = read_record(&layout).unwrap();
  assert_eq!(record.arguments, report.arguments);
}

#[tokio::test]
async fn failed_native_build_installs_nothing() {
  let temp = TempDir::new().unwrap();
  let src = source_tree(temp.path());
  let prefix = temp.path().join("prefix");
  let runner = FakeToolchain {
    make_code: 2,
    ..FakeToolchain::new()
  };

  let err = sequential_recipe(&prefix)
    .install(&runner, &SourceLocation::Directory(src))
    .await
    .unwrap_err();

  assert!(matches!(err, FormulaError::Build(_)));
  assert!(err.to_string().contains("exit code Some(2)"));
  assert!(!prefix.exists());
}

#[tokio::test]
async fn configuration_error_runs_nothing() {
  let temp = TempDir::new().unwrap();
  let prefix = temp.path().join("prefix");
  let runner = FakeToolchain::new();
  let recipe = Recipe {
    toggles: Toggles::new().enable(Feature::Scotch5),
    deps: DependencyTable::new(),
    compilers: Compilers::default(),
    os: Os::Linux,
    prefix: prefix.clone(),
  };

  // The source directory does not even exist: resolution must fail first.
  let err = recipe
    .install(&runner, &SourceLocation::Directory(temp.path().join("missing")))
    .await
    .unwrap_err();

  assert!(matches!(err, FormulaError::Configuration(_)));
  assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn parallel_install_then_verify_uses_mpirun() {
  let temp = TempDir::new().unwrap();
  let src = source_tree(temp.path());
  let prefix = temp.path().join("prefix");
  let runner = FakeToolchain::new();
  let recipe = Recipe {
    toggles: Toggles::new(),
    deps: DependencyTable::new().with(Dependency::OpenMpi, DependencyLocation::new("/opt/open-mpi")),
    compilers: Compilers::default().with_mpi("mpicc", "mpif90"),
    os: Os::Linux,
    prefix: prefix.clone(),
  };

  let report = recipe
    .install(&runner, &SourceLocation::Directory(src))
    .await
    .unwrap();
  assert_eq!(report.template, Template::Parallel);
  assert!(report.caveats.is_none());
  assert!(InstallLayout::new(&prefix).include().join("dmumps_c.h").is_file());

  let verified = verify_prefix(&runner, &prefix).await.unwrap();
  assert_eq!(verified.passed.len(), 5);

  let examples: Vec<_> = runner.calls().into_iter().skip(1).collect();
  assert_eq!(examples.len(), 5);
  assert!(examples.iter().all(|c| c.program == "mpirun"));
  assert_eq!(examples[0].args[..2], ["-np".to_string(), "2".to_string()]);
}

#[tokio::test]
async fn verify_reports_the_failing_example() {
  let temp = TempDir::new().unwrap();
  let src = source_tree(temp.path());
  let prefix = temp.path().join("prefix");
  let runner = FakeToolchain::new();
  sequential_recipe(&prefix)
    .install(&runner, &SourceLocation::Directory(src))
    .await
    .unwrap();

  let failing = FakeToolchain {
    example_code: 1,
    ..FakeToolchain::new()
  };
  let err = verify_prefix(&failing, &prefix).await.unwrap_err();

  assert!(err.to_string().contains("ssimpletest"));
}

#[tokio::test]
async fn verify_without_install_record_fails() {
  let temp = TempDir::new().unwrap();
  let err = verify_prefix(&FakeToolchain::new(), temp.path()).await.unwrap_err();
  assert!(matches!(err, FormulaError::Install(_)));
}

#[tokio::test]
async fn install_from_archive_builds_in_unpacked_root() {
  let temp = TempDir::new().unwrap();
  let archive = temp.path().join("MUMPS_4.10.0.tar.gz");
  source_tarball(&archive);
  let prefix = temp.path().join("prefix");
  let runner = FakeToolchain::new();

  let report = sequential_recipe(&prefix)
    .install(&runner, &SourceLocation::Archive(archive))
    .await
    .unwrap();

  assert_eq!(report.template, Template::Sequential);
  assert_eq!(report.installed.libraries.len(), 4);

  let calls = runner.calls();
  assert_eq!(calls.len(), 1);
  let build_dir = calls[0].cwd.clone().unwrap();
  assert!(build_dir.ends_with("src"));
  // The scratch tree lives until the install is done, then goes away.
  assert!(!build_dir.exists());

  let layout = InstallLayout::new(&prefix);
  assert_eq!(fs::read_to_string(layout.makefile_record()).unwrap(), "# sequential\n");
  assert!(layout.lib().join("libdmumps.so").is_file());
  assert!(layout.lib().join("libmpiseq.so").is_file());
  assert!(layout.include().join("dmumps_c.h").exists());
  assert!(layout.doc().join("userguide_4.10.0.pdf").is_file());
  assert!(layout.examples().join("input_simpletest_real").is_file());
  assert!(!layout.examples().join("dsimpletest.o").exists());
}

#[tokio::test]
async fn install_from_missing_archive_fails_before_building() {
  let temp = TempDir::new().unwrap();
  let prefix = temp.path().join("prefix");
  let runner = FakeToolchain::new();

  let err = sequential_recipe(&prefix)
    .install(&runner, &SourceLocation::Archive(temp.path().join("missing.tar.gz")))
    .await
    .unwrap_err();

  assert!(matches!(err, FormulaError::Source(_)));
  assert!(runner.calls().is_empty());
  assert!(!prefix.exists());
}
