use std::fmt;
use std::path::Path;

/// Operating systems the recipe knows how to link shared libraries on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
    }
  }

  /// File extension of shared libraries, including the dot
  pub fn shared_lib_ext(&self) -> &'static str {
    match self {
      Self::Linux => ".so",
      Self::MacOs => ".dylib",
    }
  }

  /// Archiver command that links `$@` as a shared library with `$(FL)`.
  ///
  /// The Makefiles invoke `$(AR)$@`, so the trailing space is required.
  pub fn shared_archiver(&self, lib_dir: &Path) -> String {
    match self {
      Self::Linux => "$(FL) -shared -Wl,-soname,$(notdir $@) -o ".to_string(),
      Self::MacOs => format!(
        "$(FL) -shared -Wl,-install_name -Wl,{}/$(notdir $@) -undefined dynamic_lookup -o ",
        lib_dir.display()
      ),
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
