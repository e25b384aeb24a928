//! The invocation contract exposed as a binary's argument surface.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Clone, Debug)]
#[clap(author, about = "Finds unused files, dependencies, and exports in a project", long_about = None)]
#[clap(disable_help_subcommand = true)]
pub struct Args {
    /// Directory to analyse. Defaults to the current directory.
    #[clap(long, global = true)]
    pub working_directory: Option<PathBuf>,

    /// Explicit path to the compiler config file. When unset, discovery
    /// looks for `knip.json` then `knip.jsonc` in the working directory.
    #[clap(long, global = true)]
    pub compiler_config: Option<PathBuf>,

    /// Respect .gitignore when expanding project globs.
    #[clap(long, global = true, default_value_t = true, action = clap::ArgAction::Set)]
    pub gitignore: bool,

    /// Reject dependencies only reachable through ancestor workspaces or
    /// peer-dependency satisfaction.
    #[clap(long, global = true)]
    pub strict: bool,

    /// Only follow production-flagged entry globs while seeding.
    #[clap(long, global = true)]
    pub production: bool,

    /// Display a progress indicator while the fixed point runs.
    #[clap(long, global = true, default_value_t = true, action = clap::ArgAction::Set)]
    pub progress: bool,

    /// Print the raw issue map as JSON instead of the human-readable
    /// report.
    #[clap(long, global = true)]
    pub json: bool,

    /// Verbosity: repeat for more detail (-v, -vv, -vvv).
    #[clap(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
