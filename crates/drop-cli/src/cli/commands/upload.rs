//! `drop [INFILE]` – upload and print the public URL.

use anyhow::{Context, Result};
use drop_core::config::DestinationProfile;
use drop_core::notify::{notify_quietly, Notifier};
use drop_core::transfer::Transfer;
use drop_core::upload::{self, UploadOutcome, UploadRequest};
use std::io;
use std::path::Path;

/// Read INFILE, or stdin when it is absent or `-`.
pub fn read_request(infile: Option<&Path>) -> Result<UploadRequest> {
    match infile {
        Some(path) if path != Path::new("-") => UploadRequest::from_path(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => UploadRequest::from_reader(io::stdin().lock()).context("reading standard input"),
    }
}

/// Upload and return the lines to print on stdout.
pub fn upload_lines(
    request: &UploadRequest,
    profile: &DestinationProfile,
    transfer: &dyn Transfer,
    notifier: &dyn Notifier,
) -> Result<(UploadOutcome, Vec<String>)> {
    let outcome = upload::upload(request, profile, transfer)?;
    let mut lines = vec![outcome.url.clone()];
    if notify_quietly(notifier, &outcome.url) {
        lines.push("copied to clipboard.".to_string());
    }
    Ok((outcome, lines))
}

pub fn run_upload(
    request: &UploadRequest,
    profile: &DestinationProfile,
    transfer: &dyn Transfer,
    notifier: &dyn Notifier,
) -> Result<()> {
    let (outcome, lines) = upload_lines(request, profile, transfer, notifier)?;
    tracing::info!(
        destination = %profile.name,
        location = %outcome.remote_location,
        "uploaded {} bytes",
        request.bytes().len()
    );
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drop_core::error::{DropError, TransferFailure};
    use drop_core::naming::HashAlgorithm;
    use std::cell::Cell;

    fn profile() -> DestinationProfile {
        DestinationProfile {
            name: "web".to_string(),
            remote_server: "me@example.org".to_string(),
            remote_dir: "/srv/www".to_string(),
            url_prefix: "https://example.org/f/".to_string(),
            file_mode: 0o644,
            hash_length: 8,
            hash_algorithm: HashAlgorithm::Sha1,
        }
    }

    struct Accept;

    impl Transfer for Accept {
        fn transfer(&self, _local: &Path, _server: &str, _path: &str) -> Result<(), DropError> {
            Ok(())
        }
    }

    struct Reject;

    impl Transfer for Reject {
        fn transfer(&self, _local: &Path, server: &str, path: &str) -> Result<(), DropError> {
            Err(DropError::Transfer {
                destination: format!("{server}:{path}"),
                reason: TransferFailure::Spawn(io::Error::other("unreachable")),
            })
        }
    }

    struct Clipboard {
        delivered: bool,
        calls: Cell<usize>,
    }

    impl Notifier for Clipboard {
        fn notify(&self, _url: &str) -> anyhow::Result<bool> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.delivered)
        }
    }

    #[test]
    fn prints_url_and_clipboard_notice() {
        let request = UploadRequest::new(b"hello\n".to_vec(), Some("txt".into()));
        let clip = Clipboard {
            delivered: true,
            calls: Cell::new(0),
        };
        let (outcome, lines) = upload_lines(&request, &profile(), &Accept, &clip).unwrap();
        assert_eq!(outcome.remote_name, "9XLTlvrp.txt");
        assert_eq!(
            lines,
            vec!["https://example.org/f/9XLTlvrp.txt", "copied to clipboard."]
        );
        assert_eq!(clip.calls.get(), 1);
    }

    #[test]
    fn no_notice_without_clipboard() {
        let request = UploadRequest::new(b"hello\n".to_vec(), None);
        let clip = Clipboard {
            delivered: false,
            calls: Cell::new(0),
        };
        let (_, lines) = upload_lines(&request, &profile(), &Accept, &clip).unwrap();
        assert_eq!(lines, vec!["https://example.org/f/9XLTlvrp"]);
    }

    #[test]
    fn failed_transfer_prints_nothing_and_skips_clipboard() {
        let request = UploadRequest::new(b"x".to_vec(), None);
        let clip = Clipboard {
            delivered: true,
            calls: Cell::new(0),
        };
        let err = upload_lines(&request, &profile(), &Reject, &clip).unwrap_err();
        assert!(err.downcast_ref::<DropError>().is_some());
        assert_eq!(clip.calls.get(), 0);
    }

    #[test]
    fn missing_infile_is_an_input_error() {
        let missing = std::env::temp_dir().join("drop-cli-test-missing-infile");
        let err = read_request(Some(&missing)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DropError>(),
            Some(DropError::Input(_))
        ));
    }
}
