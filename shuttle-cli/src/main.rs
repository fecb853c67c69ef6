//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use shuttle_cli::CliError;

fn main() {
    match shuttle_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("shuttle: {err}");
            std::process::exit(1);
        }
    }
}
