//! docrest CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, logs a FATAL event
//! and exits non-zero on failure.

use docrest::cli;
use docrest::observability::Logger;

fn main() {
    if let Err(e) = cli::run() {
        let message = e.message();
        Logger::fatal(
            "CLI_FAILED",
            &[("code", e.code_str()), ("message", message.as_str())],
        );
        std::process::exit(1);
    }
}
