// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gantry")]
#[command(about = "Build, tag, and push versioned images for every service in a project")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the manifest (defaults to gantry.yml in the current directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress progress output (for CI logs)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit JSON lines instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new gantry.yml manifest file
    Init {
        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// Build, tag, and push images for the configured services
    Release(ReleaseArgs),

    /// Run the configured checks without building anything
    Preflight,
}

#[derive(Args)]
pub struct ReleaseArgs {
    /// Name of the git ref that triggered the run (e.g. v2.1.0 or main)
    #[arg(long, env = "GANTRY_REF_NAME")]
    pub ref_name: Option<String>,

    /// Kind of the triggering ref: "tag" or "branch"; omit for a manual run
    #[arg(long, env = "GANTRY_REF_TYPE")]
    pub ref_type: Option<String>,

    /// CI run number, appended to tag-push versions
    #[arg(long, env = "GANTRY_RUN_NUMBER", default_value_t = 0)]
    pub run_number: u64,

    /// Release only the named service (repeatable)
    #[arg(short, long = "service", value_name = "NAME")]
    pub services: Vec<String>,

    /// Resolve the full plan and print it without building anything
    #[arg(long)]
    pub dry_run: bool,

    /// How many services build at once
    #[arg(long, default_value_t = 4, value_name = "N")]
    pub parallel: usize,

    /// Overall deadline for the run, e.g. "30m" (unbounded when omitted)
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub timeout: Option<Duration>,

    /// Build without the layer cache
    #[arg(long)]
    pub no_cache: bool,
}
