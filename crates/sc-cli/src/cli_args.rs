use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sc-cli")]
#[command(about = "Validate and expand browser signature definitions")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Check every child definition without expanding anything.
    Validate(ValidateArgs),
    /// Validate, expand and merge into concrete records.
    Build(BuildArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    #[arg(long = "resources-dir")]
    pub(crate) resources_dir: String,
}

#[derive(Debug, Args)]
pub(crate) struct BuildArgs {
    #[arg(long = "resources-dir")]
    pub(crate) resources_dir: String,
    /// Write records here instead of stdout.
    #[arg(long = "output")]
    pub(crate) output: Option<String>,
    #[arg(long = "fail-fast", default_value_t = false)]
    pub(crate) fail_fast: bool,
}
