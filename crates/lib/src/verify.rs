//! Post-install verification.
//!
//! Runs the example programs shipped with MUMPS from the installed examples
//! directory. Success is judged by exit code and, where a program declares
//! one, by a substring expected on stdout.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::exec::{CommandRunner, Invocation};
use crate::install::InstallLayout;
use crate::resolve::Template;

/// Launcher prepended to every example when the build uses MPI.
pub const MPI_LAUNCHER: [&str; 3] = ["mpirun", "-np", "2"];

#[derive(Debug, Error)]
pub enum VerifyError {
  #[error("example {name} is not installed at {path}")]
  Missing { name: String, path: PathBuf },

  #[error("example {name} failed with exit code {code:?}")]
  Failed { name: String, code: Option<i32> },

  #[error("example {name} did not print the expected output {expected:?}")]
  OutputMismatch { name: String, expected: String },

  #[error("failed to run example {name}: {source}")]
  Io {
    name: String,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleProgram {
  pub name: String,
  /// Input fixture from the examples directory, fed on stdin.
  pub input: Option<String>,
  pub expect_stdout: Option<String>,
}

impl ExampleProgram {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      input: None,
      expect_stdout: None,
    }
  }

  pub fn with_input(mut self, input: &str) -> Self {
    self.input = Some(input.to_string());
    self
  }

  pub fn expecting(mut self, text: &str) -> Self {
    self.expect_stdout = Some(text.to_string());
    self
  }
}

/// The four precision variants of the simple test, then the C example.
pub fn default_programs() -> Vec<ExampleProgram> {
  vec![
    ExampleProgram::new("ssimpletest").with_input("input_simpletest_real"),
    ExampleProgram::new("dsimpletest").with_input("input_simpletest_real"),
    ExampleProgram::new("csimpletest").with_input("input_simpletest_cmplx"),
    ExampleProgram::new("zsimpletest").with_input("input_simpletest_cmplx"),
    ExampleProgram::new("c_example"),
  ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
  pub passed: Vec<String>,
}

pub fn invocation_for(program: &ExampleProgram, layout: &InstallLayout, template: Template) -> Invocation {
  let examples = layout.examples();
  let binary = examples.join(&program.name).display().to_string();

  let invocation = if template.is_parallel() {
    Invocation::new(MPI_LAUNCHER[0]).args(MPI_LAUNCHER[1..].iter().copied()).arg(binary)
  } else {
    Invocation::new(binary)
  };

  let invocation = invocation.current_dir(&examples);
  match &program.input {
    Some(input) => invocation.stdin_file(&examples.join(input)),
    None => invocation,
  }
}

/// Run `programs` in order, stopping at the first failure.
pub async fn verify<R: CommandRunner>(
  runner: &R,
  layout: &InstallLayout,
  template: Template,
  programs: &[ExampleProgram],
) -> Result<VerifyReport, VerifyError> {
  let mut report = VerifyReport::default();

  for program in programs {
    let binary = layout.examples().join(&program.name);
    if !binary.is_file() {
      return Err(VerifyError::Missing {
        name: program.name.clone(),
        path: binary,
      });
    }
    if let Some(input) = &program.input {
      let fixture = layout.examples().join(input);
      if !fixture.is_file() {
        return Err(VerifyError::Missing {
          name: program.name.clone(),
          path: fixture,
        });
      }
    }

    let invocation = invocation_for(program, layout, template);
    info!(example = %program.name, "running example");
    debug!(cmd = %invocation, "example invocation");

    let output = runner.run(&invocation).await.map_err(|source| VerifyError::Io {
      name: program.name.clone(),
      source,
    })?;

    if !output.success() {
      return Err(VerifyError::Failed {
        name: program.name.clone(),
        code: output.code,
      });
    }
    if let Some(expected) = &program.expect_stdout {
      if !output.stdout.contains(expected.as_str()) {
        return Err(VerifyError::OutputMismatch {
          name: program.name.clone(),
          expected: expected.clone(),
        });
      }
    }

    report.passed.push(program.name.clone());
  }

  Ok(report)
}
