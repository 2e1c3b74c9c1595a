//! External command execution.
//!
//! The native build and the post-install checks both go through
//! [`CommandRunner`], so tests can substitute a recording runner for the real
//! process spawner.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// A fully described external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  pub env: BTreeMap<String, String>,
  /// File connected to the child's stdin (shell `< file`).
  pub stdin: Option<PathBuf>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      ..Default::default()
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: &Path) -> Self {
    self.cwd = Some(dir.to_path_buf());
    self
  }

  pub fn env(mut self, key: &str, value: &str) -> Self {
    self.env.insert(key.to_string(), value.to_string());
    self
  }

  pub fn stdin_file(mut self, path: &Path) -> Self {
    self.stdin = Some(path.to_path_buf());
    self
  }
}

/// Shell-like rendering for logs and error messages.
impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      if arg.contains(char::is_whitespace) {
        write!(f, " \"{}\"", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    if let Some(stdin) = &self.stdin {
      write!(f, " < {}", stdin.display())?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// Exit code, `None` when the process was killed by a signal.
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

pub trait CommandRunner {
  fn run(&self, invocation: &Invocation) -> impl Future<Output = io::Result<CommandOutput>> + Send;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
    let mut command = Command::new(&invocation.program);
    command
      .args(&invocation.args)
      .envs(&invocation.env)
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());

    if let Some(cwd) = &invocation.cwd {
      command.current_dir(cwd);
    }

    match &invocation.stdin {
      Some(path) => {
        command.stdin(Stdio::from(File::open(path)?));
      }
      None => {
        command.stdin(Stdio::null());
      }
    }

    debug!(cmd = %invocation, cwd = ?invocation.cwd, "spawning process");

    let output = command.output().await?;
    let result = CommandOutput {
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !result.stderr.is_empty() {
      debug!(stderr = %result.stderr.trim_end(), "command stderr");
    }

    Ok(result)
  }
}
