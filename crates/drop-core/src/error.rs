//! Error type shared by every stage of an upload.
//!
//! Every variant is terminal for the current invocation; nothing in the core
//! retries.

use std::fmt;
use std::io;
use std::process::ExitStatus;

/// Why a requested destination could not be narrowed to exactly one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmbiguousDestination {
    /// No profile name starts with the requested prefix.
    NoMatch { requested: String },
    /// More than one profile name starts with the requested prefix.
    MultipleMatches {
        requested: String,
        candidates: Vec<String>,
    },
}

impl fmt::Display for AmbiguousDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguousDestination::NoMatch { requested } => {
                write!(f, "no destination matches '{}'", requested)
            }
            AmbiguousDestination::MultipleMatches {
                requested,
                candidates,
            } => write!(
                f,
                "'{}' matches more than one destination: {}",
                requested,
                candidates.join(", ")
            ),
        }
    }
}

/// Self-test failure: the public URL could not be fetched or served different bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// Invalid URL, connection failure, timeout, or non-2xx response.
    Fetch(String),
    /// The fetched body differs from the uploaded payload.
    Mismatch {
        expected_len: usize,
        actual_len: usize,
        /// Offset of the first differing byte, if the shorter body is not a prefix of the longer one.
        first_difference: Option<usize>,
    },
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationFailure::Fetch(msg) => write!(f, "fetch failed: {}", msg),
            VerificationFailure::Mismatch {
                expected_len,
                actual_len,
                first_difference,
            } => {
                write!(
                    f,
                    "different data found at remote url than expected ({} bytes expected, {} fetched",
                    expected_len, actual_len
                )?;
                if let Some(offset) = first_difference {
                    write!(f, ", first difference at byte {}", offset)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    AmbiguousDestination(AmbiguousDestination),

    #[error("invalid extension '{0}': extensions must be UTF-8 and may not contain path separators")]
    InvalidExtension(String),

    #[error("failed to read input: {0}")]
    Input(#[source] io::Error),

    #[error("failed to stage upload: {0}")]
    Staging(#[source] io::Error),

    #[error(
        "transfer to {destination} failed ({reason}); common causes: remote directory \
         not present, scp command invalid, or unable to log in"
    )]
    Transfer {
        destination: String,
        reason: TransferFailure,
    },

    #[error("verification failed: {0}")]
    Verification(VerificationFailure),
}

/// How the external copy program failed.
#[derive(Debug)]
pub enum TransferFailure {
    /// The program could not be started (e.g. not installed).
    Spawn(io::Error),
    /// The program ran and exited unsuccessfully.
    Exit(ExitStatus),
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferFailure::Spawn(e) => write!(f, "could not run copy program: {}", e),
            TransferFailure::Exit(status) => match status.code() {
                Some(code) => write!(f, "copy program exited with status {}", code),
                None => write!(f, "copy program terminated by signal"),
            },
        }
    }
}

impl DropError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        DropError::Config(msg.into())
    }
}
