//! Implementation of the `mumps test` command.

use std::path::Path;

use anyhow::{Context, Result};

use mumps_lib::exec::SystemRunner;
use mumps_lib::formula;

use crate::output::{OutputFormat, print_info, print_json, print_success};

pub fn cmd_test(prefix: &Path, format: OutputFormat) -> Result<()> {
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(formula::test(&SystemRunner, prefix))
    .with_context(|| format!("Verification of {} failed", prefix.display()))?;

  if format.is_json() {
    return print_json(&report);
  }

  for name in &report.passed {
    print_success(name);
  }
  print_info(&format!("{} example programs passed", report.passed.len()));
  Ok(())
}
