use anyhow::Result;
use serde::Serialize;

use mumps_lib::Feature;
use mumps_lib::consts::MUMPS_VERSION;
use mumps_lib::platform::host_description;
use mumps_lib::source::MUMPS;

use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct Info {
  version: &'static str,
  mumps: &'static str,
  platform: Option<String>,
  source: &'static str,
  defaults: Vec<(Feature, bool)>,
}

pub fn cmd_info(format: OutputFormat) -> Result<()> {
  let info = Info {
    version: env!("CARGO_PKG_VERSION"),
    mumps: MUMPS_VERSION,
    platform: host_description(),
    source: MUMPS.url,
    defaults: Feature::ALL.into_iter().map(|f| (f, f.default_enabled())).collect(),
  };

  if format.is_json() {
    return print_json(&info);
  }

  println!("System:");
  match &info.platform {
    Some(platform) => print_stat("Platform", platform),
    None => print_stat("Platform", "unsupported"),
  }
  println!("Recipe:");
  print_stat("MUMPS", info.mumps);
  print_stat("Source", info.source);
  for (feature, enabled) in &info.defaults {
    print_stat(feature.as_str(), if *enabled { "on by default" } else { "off by default" });
  }
  Ok(())
}
