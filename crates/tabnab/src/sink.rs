//! Output destinations

use crate::error::Error;
use async_trait::async_trait;
use std::io::{self, Write};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Clipboard command on macOS
pub const DEFAULT_CLIPBOARD_COMMAND: &str = "pbcopy";

/// Receives the final rendered output
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(&self, output: &str) -> Result<(), Error>;
}

/// Standard output
///
/// A closed pipe (for example `tabnab list | head -1`) is not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn write(&self, output: &str) -> Result<(), Error> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        match writeln!(handle, "{output}").and_then(|()| handle.flush()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            Err(e) => Err(Error::Sink(format!("stdout: {e}"))),
        }
    }
}

/// System clipboard, fed through a copy command's standard input
#[derive(Debug, Clone)]
pub struct ClipboardSink {
    program: String,
    args: Vec<String>,
}

impl Default for ClipboardSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardSink {
    pub fn new() -> Self {
        Self::with_command(DEFAULT_CLIPBOARD_COMMAND, Vec::<String>::new())
    }

    /// Use another copy command, such as `xclip -selection clipboard`
    pub fn with_command(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Sink for ClipboardSink {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    async fn write(&self, output: &str) -> Result<(), Error> {
        debug!(program = %self.program, bytes = output.len(), "Copying to clipboard");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Sink(format!("failed to start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(output.as_bytes())
                .await
                .map_err(|e| Error::Sink(format!("{}: {e}", self.program)))?;
        }

        let result = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Sink(format!("{}: {e}", self.program)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(Error::Sink(if stderr.is_empty() {
                format!("{} exited with {}", self.program, result.status)
            } else {
                stderr
            }));
        }
        Ok(())
    }
}
