//! CLI for drop: upload a file over scp and print its public URL.

mod commands;

use anyhow::Result;
use clap::Parser;
use drop_core::config;
use drop_core::notify::{self, NoopNotifier, Notifier};
use drop_core::resolver;
use drop_core::transfer::ScpTransfer;
use drop_core::verify::CurlFetcher;
use std::io::Write;
use std::path::PathBuf;

use commands::{read_request, run_list, run_self_test, run_upload};

/// Uploads data to a remote www directory via scp and prints a public URL.
#[derive(Debug, Parser)]
#[command(name = "drop", long_about = None)]
pub struct Cli {
    /// Name (or unique prefix) of a destination from the configuration file.
    #[arg(short, long, value_name = "NAME")]
    pub destination: Option<String>,

    /// List all destinations defined in the configuration and exit.
    #[arg(short, long)]
    pub list_destinations: bool,

    /// File to upload. Reads standard input when omitted or `-`.
    #[arg(value_name = "INFILE")]
    pub infile: Option<PathBuf>,

    /// Overwrite the extension of the uploaded file ("" for none).
    #[arg(short, long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Configuration file merged on top of the system and user files.
    #[arg(short, long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Upload a timestamped test file to the destination and fetch it back.
    #[arg(long)]
    pub test: bool,

    /// Do not copy the URL to the clipboard.
    #[arg(long)]
    pub no_clipboard: bool,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        Cli::parse().run()
    }

    pub fn run(self) -> Result<()> {
        let cfg = config::load(self.config_file.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        if self.list_destinations {
            return run_list(&cfg);
        }

        let profile = resolver::resolve_in(self.destination.as_deref(), &cfg)?;
        let transfer = ScpTransfer::default();

        if self.test {
            if self.infile.is_some() || self.extension.is_some() {
                tracing::warn!("--test ignores INFILE and --extension");
            }
            return run_self_test(profile, &transfer, &CurlFetcher);
        }

        let request = read_request(self.infile.as_deref())?.with_extension_override(self.extension);
        let notifier: Box<dyn Notifier> = if self.no_clipboard {
            Box::new(NoopNotifier)
        } else {
            notify::detect()
        };
        run_upload(&request, profile, &transfer, notifier.as_ref())
    }
}

/// Report a fatal error once on the error stream.
pub fn report_error<W: Write>(out: &mut W, err: &anyhow::Error) {
    let _ = writeln!(out, "drop error: {:#}", err);
}

#[cfg(test)]
mod tests;
