use std::ffi::OsString;
use std::path::Path;

use clap::Parser;
use sc_api::{build_from_dir, load_dir, validate_tree, BuildOptions, ConcreteRecord};

mod cli_args;
mod error_map;

pub(crate) use cli_args::{BuildArgs, Cli, Mode, ValidateArgs};
pub(crate) use error_map::{
    emit_diagnostics, emit_error, map_cli_output_encode, map_cli_output_write, CliError,
};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            // --help and --version land here too.
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Mode::Validate(args) => run_validate(args),
        Mode::Build(args) => run_build(args),
    }
}

fn run_validate(args: ValidateArgs) -> Result<i32, CliError> {
    let tree = load_dir(Path::new(&args.resources_dir))?;
    let diagnostics = validate_tree(&tree);
    if !diagnostics.is_empty() {
        return Ok(emit_diagnostics(&diagnostics));
    }

    println!("RESULT:OK");
    println!("FAMILIES:{}", tree.families.len());
    Ok(0)
}

fn run_build(args: BuildArgs) -> Result<i32, CliError> {
    let options = BuildOptions {
        fail_fast: args.fail_fast,
    };
    let outcome = build_from_dir(Path::new(&args.resources_dir), options)?;
    if !outcome.is_ok() {
        return Ok(emit_diagnostics(&outcome.diagnostics));
    }

    let records_json = render_records(&outcome.records)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, records_json).map_err(map_cli_output_write)?;
            tracing::info!(path = %path, records = outcome.records.len(), "wrote records");
        }
        None => println!("{}", records_json),
    }

    println!("RESULT:OK");
    println!("RECORDS:{}", outcome.records.len());
    Ok(0)
}

fn render_records(records: &[ConcreteRecord]) -> Result<String, CliError> {
    serde_json::to_string_pretty(records).map_err(map_cli_output_encode)
}
