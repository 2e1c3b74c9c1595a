//! Shared helpers: a simulated toolchain and MUMPS source fixtures.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flate2::Compression;
use flate2::write::GzEncoder;
use mumps_lib::exec::{CommandOutput, CommandRunner, Invocation};

/// Pretends to be `make all` (writes the usual outputs into the build tree)
/// and answers every other command with `example_code`.
pub struct FakeToolchain {
  pub make_code: i32,
  pub example_code: i32,
  pub calls: Mutex<Vec<Invocation>>,
}

impl FakeToolchain {
  pub fn new() -> Self {
    Self {
      make_code: 0,
      example_code: 0,
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.lock().unwrap().clone()
  }
}

pub fn write(path: &Path, content: &str) {
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn simulate_make(dir: &Path, ext: &str) {
  for lib in ["libdmumps", "libmumps_common", "libpord"] {
    write(&dir.join("lib").join(format!("{}{}", lib, ext)), "");
  }
  write(&dir.join("libseq").join(format!("libmpiseq{}", ext)), "");
  write(&dir.join("libseq/mpi.h"), "");
  for example in ["ssimpletest", "dsimpletest", "csimpletest", "zsimpletest", "c_example"] {
    write(&dir.join("examples").join(example), "");
    write(&dir.join("examples").join(format!("{}.o", example)), "");
  }
}

impl CommandRunner for FakeToolchain {
  async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
    self.calls.lock().unwrap().push(invocation.clone());
    let code = if invocation.program == "make" {
      let dir = invocation.cwd.clone().unwrap_or_default();
      if !dir.join("Makefile.inc").is_file() {
        // make without a Makefile.inc fails like the real build would.
        2
      } else {
        if self.make_code == 0 {
          let ext = invocation
            .args
            .iter()
            .find_map(|a| a.strip_prefix("LIBEXT="))
            .unwrap_or(".so")
            .to_string();
          simulate_make(&dir, &ext);
        }
        self.make_code
      }
    } else {
      self.example_code
    };
    Ok(CommandOutput {
      code: Some(code),
      ..Default::default()
    })
  }
}

const SOURCE_FILES: &[(&str, &str)] = &[
  ("Make.inc/Makefile.gfortran.SEQ", "# sequential\n"),
  ("Make.inc/Makefile.gfortran.PAR", "# parallel\n"),
  ("include/dmumps_c.h", ""),
  ("doc/userguide_4.10.0.pdf", ""),
  ("examples/input_simpletest_real", ""),
  ("examples/input_simpletest_cmplx", ""),
];

/// An unpacked MUMPS source tree, before building.
pub fn source_tree(root: &Path) -> PathBuf {
  let src = root.join("MUMPS_4.10.0");
  for (name, content) in SOURCE_FILES {
    write(&src.join(name), content);
  }
  src
}

/// The same tree packed the way upstream ships it, under `MUMPS_4.10.0/`.
pub fn source_tarball(path: &Path) {
  let file = File::create(path).unwrap();
  let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
  for (name, content) in SOURCE_FILES {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
      .append_data(&mut header, format!("MUMPS_4.10.0/{}", name), content.as_bytes())
      .unwrap();
  }
  builder.into_inner().unwrap().finish().unwrap();
}
