use sc_api::{Diagnostic, LoaderError};
use std::fmt::Display;

/// A failure that ends the CLI run before any diagnostics are printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CliError {
    pub(crate) code: String,
    pub(crate) message: String,
}

impl From<LoaderError> for CliError {
    fn from(error: LoaderError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

fn map_error(code: &'static str, error: impl Display) -> CliError {
    CliError {
        code: code.to_string(),
        message: error.to_string(),
    }
}

pub(crate) fn emit_error(error: CliError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    1
}

/// Prints one code/message pair per diagnostic, then the failing result line.
pub(crate) fn emit_diagnostics(diagnostics: &[Diagnostic]) -> i32 {
    for diagnostic in diagnostics {
        let location = match diagnostic.child_index {
            Some(index) => format!("{} child #{}", diagnostic.subject, index),
            None => diagnostic.subject.clone(),
        };
        println!("ERROR_CODE:{}", diagnostic.error.code);
        println!(
            "ERROR_MSG_JSON:{}",
            json_string(&format!("{}: {}", location, diagnostic.error.message))
        );
    }
    println!("RESULT:ERROR");
    1
}

pub(crate) fn map_cli_output_write(error: std::io::Error) -> CliError {
    map_error("CLI_OUTPUT_WRITE", error)
}

pub(crate) fn map_cli_output_encode(error: serde_json::Error) -> CliError {
    map_error("CLI_OUTPUT_ENCODE", error)
}

fn json_string(value: &str) -> String {
    serde_json::to_string(value).expect("string json")
}
