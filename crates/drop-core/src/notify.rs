//! Post-upload notification (clipboard).

use std::io::Write;
use std::process::{Command, Stdio};

/// Receives the public URL once the upload succeeded.
pub trait Notifier {
    /// Returns true when the URL was delivered (e.g. copied to the clipboard).
    fn notify(&self, url: &str) -> anyhow::Result<bool>;
}

/// Does nothing; used when no clipboard tool exists or it was disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _url: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}

/// Candidate clipboard commands, tried in order.
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
];

/// Pipes the URL into a clipboard command's stdin.
#[derive(Debug, Clone)]
pub struct ClipboardNotifier {
    program: String,
    args: Vec<String>,
}

impl ClipboardNotifier {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Notifier for ClipboardNotifier {
    fn notify(&self, url: &str) -> anyhow::Result<bool> {
        use anyhow::Context;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("spawn {}", self.program))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(url.as_bytes())
                .with_context(|| format!("write to {}", self.program))?;
        }
        let status = child
            .wait()
            .with_context(|| format!("wait for {}", self.program))?;
        if !status.success() {
            anyhow::bail!("{} exited with {}", self.program, status);
        }
        Ok(true)
    }
}

fn on_path(program: &str) -> bool {
    which::which(program).is_ok()
}

/// First available clipboard command, or a no-op notifier.
pub fn detect() -> Box<dyn Notifier> {
    for (program, args) in CLIPBOARD_COMMANDS {
        if on_path(program) {
            tracing::debug!("using {} for clipboard", program);
            return Box::new(ClipboardNotifier::new(*program, args));
        }
    }
    tracing::debug!("no clipboard command found");
    Box::new(NoopNotifier)
}

/// Deliver `url`, downgrading failures to a warning. Returns whether it was delivered.
pub fn notify_quietly(notifier: &dyn Notifier, url: &str) -> bool {
    match notifier.notify(url) {
        Ok(delivered) => delivered,
        Err(e) => {
            tracing::warn!("clipboard notification failed: {:#}", e);
            false
        }
    }
}
