//! Implementation of the `mumps install` command.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use mumps_lib::consts::MUMPS_VERSION;
use mumps_lib::exec::SystemRunner;
use mumps_lib::formula::SourceLocation;
use mumps_lib::install::InstallLayout;
use mumps_lib::platform::paths::cache_dir;

use super::RecipeArgs;
use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_step, print_success, print_warning};

/// Execute the install command.
///
/// Resolves the build options, obtains the sources (a local tree, a local
/// archive, or a download), runs the serial native build and installs the
/// result into `prefix` together with a record of the arguments used.
///
/// # Errors
///
/// Returns an error on configuration problems, download or checksum failures,
/// a failing native build, or I/O errors while installing.
pub fn cmd_install(
  args: &RecipeArgs,
  prefix: &Path,
  source: Option<PathBuf>,
  archive: Option<PathBuf>,
  cache: Option<PathBuf>,
  format: OutputFormat,
) -> Result<()> {
  let start = Instant::now();

  // Configuration errors must not leave an empty prefix behind.
  args
    .recipe(prefix)?
    .resolve()
    .context("Failed to resolve build options")?;

  fs::create_dir_all(prefix).with_context(|| format!("Failed to create prefix: {}", prefix.display()))?;
  let prefix = dunce::canonicalize(prefix).with_context(|| format!("Failed to resolve prefix: {}", prefix.display()))?;

  let recipe = args.recipe(&prefix)?;

  let location = match (source, archive) {
    (Some(dir), _) => SourceLocation::Directory(dir),
    (None, Some(archive)) => SourceLocation::Archive(archive),
    (None, None) => SourceLocation::Download {
      cache_dir: cache.unwrap_or_else(cache_dir),
    },
  };

  debug!(source = ?location, "source location");

  if !format.is_json() {
    print_step(&format!("Installing MUMPS {} into {}", MUMPS_VERSION, prefix.display()));
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(recipe.install(&SystemRunner, &location))
    .context("Install failed")?;

  let layout = InstallLayout::new(&prefix);
  info!(path = %layout.make_args_record().display(), "build record saved");

  if format.is_json() {
    return print_json(&report);
  }

  print_success(&format!("Installed MUMPS {}", MUMPS_VERSION));
  print_stat("Template", report.template.name());
  print_stat("Libraries", &report.installed.libraries.len().to_string());
  print_stat("Headers", &report.installed.headers.len().to_string());
  print_stat("Examples", &report.installed.examples.len().to_string());
  print_stat("Took", &format_duration(start.elapsed()));

  if let Some(caveats) = &report.caveats {
    println!();
    print_warning("Caveats");
    for line in caveats.lines() {
      println!("  {}", line);
    }
  }

  Ok(())
}
