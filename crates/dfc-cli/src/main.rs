//! dfc - identifier and slug reconciliation for Document/Family/Collection tables.

use std::process::ExitCode;

use dfc_cli::error::exit_code_from_error;

fn main() -> ExitCode {
    match dfc_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
