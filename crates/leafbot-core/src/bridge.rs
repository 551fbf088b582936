//! External process bridge.
//!
//! The detector, growth-stage model, robot driver and live camera run as
//! separate programs. They are invoked per request; structured data travels
//! as JSON on stdin/stdout and a non-zero exit status is an error.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Program plus fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Check whether the program can be found on PATH (or as a path).
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    fn display_with(&self, extra: &[OsString]) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.extend(extra.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Run the program with extra arguments, optionally feeding stdin.
    ///
    /// Returns captured stdout on success.
    pub async fn run(&self, extra: &[OsString], stdin: Option<&[u8]>) -> Result<Vec<u8>> {
        let rendered = self.display_with(extra);
        debug!(command = %rendered, "Running bridge command");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .args(extra)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ProgramNotFound(self.program.clone()),
            _ => Error::Io(e),
        })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            // A child that exits without reading stdin is judged by its exit status.
            if let Err(e) = pipe.write_all(input).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
            // Close stdin so the child sees EOF.
            drop(pipe);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::command_failed(rendered, stderr.trim()));
        }

        Ok(output.stdout)
    }

    /// Run and decode stdout as JSON.
    pub async fn run_json<T>(&self, extra: &[OsString], stdin: Option<&[u8]>) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let stdout = self.run(extra, stdin).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }
}

/// Build an argument list from mixed string and path pieces.
pub(crate) fn args<I, S>(items: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    items.into_iter().map(Into::into).collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let spec = CommandSpec::new("sh", &["-c", "echo hello"]);
        let out = spec.run(&[], None).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&out).trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_passes_stdin_and_extra_args() {
        // Extra args land in $0/$1 for `sh -c`.
        let spec = CommandSpec::new("sh", &["-c", "cat; echo \" $1\""]);
        let out = spec
            .run(&args(["sh", "tail"]), Some(b"head"))
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out).trim(), "head tail");
    }

    #[tokio::test]
    async fn test_run_reports_failure() {
        let spec = CommandSpec::new("sh", &["-c", "echo broken >&2; exit 3"]);
        let err = spec.run(&[], None).await.unwrap_err();
        match err {
            Error::CommandFailed { cmd, stderr } => {
                assert!(cmd.starts_with("sh -c"));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_with_debug_logging() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let spec = CommandSpec::new("sh", &["-c", "exit 2"]);
        let err = spec.run(&args(["sh", "--flag"]), None).await.unwrap_err();
        match err {
            Error::CommandFailed { cmd, .. } => assert_eq!(cmd, "sh -c exit 2 sh --flag"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let spec = CommandSpec::new("leafbot-no-such-program", &[]);
        assert!(!spec.is_available());
        let err = spec.run(&[], None).await.unwrap_err();
        assert!(matches!(err, Error::ProgramNotFound(_)));
    }

    #[tokio::test]
    async fn test_run_json() {
        let spec = CommandSpec::new("sh", &["-c", "echo '[1, 2, 3]'"]);
        let values: Vec<u32> = spec.run_json(&[], None).await.unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
