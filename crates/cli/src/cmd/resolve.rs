//! Implementation of the `mumps resolve` command.
//!
//! Prints the template and make arguments a build would use, without
//! fetching or building anything.

use std::path::Path;

use anyhow::{Context, Result};

use mumps_lib::install::ResolutionRecord;

use super::RecipeArgs;
use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_resolve(args: &RecipeArgs, prefix: &Path, format: OutputFormat) -> Result<()> {
  let recipe = args.recipe(prefix)?;
  let resolution = recipe.resolve().context("Failed to resolve build options")?;

  if format.is_json() {
    return print_json(&ResolutionRecord::from(&resolution));
  }

  let features: Vec<&str> = recipe
    .effective_toggles()
    .effective()
    .into_iter()
    .filter(|(_, enabled)| *enabled)
    .map(|(feature, _)| feature.as_str())
    .collect();
  print_stat("Features", &features.join(", "));
  print_stat("Template", &format!("{} (Make.inc/{})", resolution.template, resolution.template.makefile()));
  println!("Arguments:");
  for arg in &resolution.args {
    println!("  {}", arg);
  }

  Ok(())
}
