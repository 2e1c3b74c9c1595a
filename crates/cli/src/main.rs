use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use cmd::RecipeArgs;
use output::OutputFormat;

/// Build recipe for the MUMPS sparse direct solver
#[derive(Parser)]
#[command(name = "mumps")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, value_enum, global = true, default_value_t)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the template and make arguments for a configuration
  Resolve {
    #[command(flatten)]
    recipe: RecipeArgs,

    /// Installation prefix (embedded into macOS install names)
    #[arg(long, default_value = "/usr/local")]
    prefix: PathBuf,
  },

  /// Fetch, build and install MUMPS into a prefix
  Install {
    #[command(flatten)]
    recipe: RecipeArgs,

    /// Installation prefix
    #[arg(long)]
    prefix: PathBuf,

    /// Build from an already unpacked source tree
    #[arg(long, conflicts_with = "archive")]
    source: Option<PathBuf>,

    /// Build from a local source archive (.tar.gz)
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Download cache directory (default: $MUMPS_CACHE_DIR or ~/.cache/mumps)
    #[arg(long, conflicts_with_all = ["source", "archive"])]
    cache: Option<PathBuf>,
  },

  /// Run the bundled example programs against an installed prefix
  Test {
    /// Installation prefix
    #[arg(long)]
    prefix: PathBuf,
  },

  /// Show platform and recipe information
  Info,
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Resolve { recipe, prefix } => cmd::cmd_resolve(&recipe, &prefix, cli.format),
    Commands::Install {
      recipe,
      prefix,
      source,
      archive,
      cache,
    } => cmd::cmd_install(&recipe, &prefix, source, archive, cache, cli.format),
    Commands::Test { prefix } => cmd::cmd_test(&prefix, cli.format),
    Commands::Info => cmd::cmd_info(cli.format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      output::print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
