use std::{
    collections::VecDeque,
    future::Future,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use tokio::process::Command;

use crate::{
    foundation::error::{DisplayError, DisplayResult},
    status::{model::PlaybackStatus, parser::parse_status},
};

/// Default per-call limit for the external status process.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can produce a fresh [`PlaybackStatus`] on demand.
///
/// Each call is independent. Failures come back as [`DisplayError::StatusFetch`] or
/// [`DisplayError::StatusParse`]; the caller decides whether to keep an older snapshot.
pub trait StatusSource {
    /// Produce one complete status record.
    fn fetch(&mut self) -> impl Future<Output = DisplayResult<PlaybackStatus>> + Send;
}

/// Runs `mpc` (or a compatible program) and parses its stdout.
#[derive(Clone, Debug)]
pub struct MpcStatusSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for MpcStatusSource {
    fn default() -> Self {
        Self::new("mpc")
    }
}

impl MpcStatusSource {
    /// Source running `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Append `-h <host>`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.args.push("-h".to_string());
        self.args.push(host.into());
        self
    }

    /// Append `-p <port>`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.args.push("-p".to_string());
        self.args.push(port.to_string());
        self
    }

    /// Append raw arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Per-call timeout; a hung process becomes a fetch error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed on every call.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the program once and return its stdout.
    pub async fn run_raw(&self) -> DisplayResult<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                DisplayError::status_fetch(format!(
                    "'{}' did not finish within {:?}",
                    self.program, self.timeout
                ))
            })?
            .map_err(|e| {
                DisplayError::status_fetch(format!("failed to launch '{}': {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DisplayError::status_fetch(format!(
                "'{}' exited with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl StatusSource for MpcStatusSource {
    #[tracing::instrument(level = "debug", skip(self), fields(program = %self.program))]
    async fn fetch(&mut self) -> DisplayResult<PlaybackStatus> {
        let stdout = self.run_raw().await?;
        Ok(parse_status(&stdout)?)
    }
}

/// Reads the three-line status format from a file on every call.
#[derive(Clone, Debug)]
pub struct FileStatusSource {
    path: PathBuf,
}

impl FileStatusSource {
    /// Source backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatusSource for FileStatusSource {
    #[tracing::instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    async fn fetch(&mut self) -> DisplayResult<PlaybackStatus> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DisplayError::status_fetch(format!("read '{}': {e}", self.path.display()))
        })?;
        Ok(parse_status(&text)?)
    }
}

/// Replays a fixed list of outcomes, one per call.
///
/// `Ok` entries are parsed as status text; `Err` entries become fetch errors. After the script
/// runs out every call fails.
#[derive(Clone, Debug, Default)]
pub struct ScriptedStatusSource {
    script: VecDeque<Result<String, String>>,
    calls: usize,
}

impl ScriptedStatusSource {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a status text.
    pub fn then_text(mut self, text: impl Into<String>) -> Self {
        self.script.push_back(Ok(text.into()));
        self
    }

    /// Queue a fetch failure.
    pub fn then_fail(mut self, reason: impl Into<String>) -> Self {
        self.script.push_back(Err(reason.into()));
        self
    }

    /// Number of `fetch` calls so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl StatusSource for ScriptedStatusSource {
    async fn fetch(&mut self) -> DisplayResult<PlaybackStatus> {
        self.calls += 1;
        match self.script.pop_front() {
            Some(Ok(text)) => Ok(parse_status(&text)?),
            Some(Err(reason)) => Err(DisplayError::status_fetch(reason)),
            None => Err(DisplayError::status_fetch("script exhausted")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/status/source.rs"]
mod tests;
