use drop_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Log to the state dir; fall back to stderr so an unwritable home never blocks an upload.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    if let Err(err) = Cli::run_from_args() {
        cli::report_error(&mut std::io::stderr().lock(), &err);
        std::process::exit(1);
    }
}
