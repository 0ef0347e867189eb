//! External process invocation.
//!
//! An [`Invocation`] is an immutable argument vector. A [`Runner`] executes
//! it in one of three ways:
//!
//! - **capture**: stdout and stderr are collected into an [`InvocationResult`].
//! - **stream**: output flows straight to the controlling terminal.
//! - **probe**: output is discarded; only the exit status matters.
//!
//! A binary missing from `PATH` is always [`Error::ToolMissing`], never a
//! non-zero status.

use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use crate::{Error, Result};

/// Exit status reported when a process was terminated by a signal.
pub const SIGNALED: i32 = -1;

/// A program name and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation of `program` with `args`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured outcome of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    /// Exit status ([`SIGNALED`] if killed by a signal).
    pub status: i32,
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8.
    pub stderr: String,
}

impl InvocationResult {
    /// Returns `true` if the process exited with status zero.
    pub const fn success(&self) -> bool {
        self.status == 0
    }
}

/// Executes invocations.
///
/// Implemented by [`SystemRunner`] for real processes; tests substitute a
/// fake so no external binary is ever spawned.
pub trait Runner {
    /// Runs to completion, capturing both output streams.
    fn capture(&self, invocation: &Invocation) -> Result<InvocationResult>;

    /// Runs to completion with output inherited from this process.
    fn stream(&self, invocation: &Invocation) -> Result<i32>;

    /// Runs to completion with all output discarded.
    fn probe(&self, invocation: &Invocation) -> Result<i32>;
}

impl<R: Runner + ?Sized> Runner for &R {
    fn capture(&self, invocation: &Invocation) -> Result<InvocationResult> {
        (**self).capture(invocation)
    }

    fn stream(&self, invocation: &Invocation) -> Result<i32> {
        (**self).stream(invocation)
    }

    fn probe(&self, invocation: &Invocation) -> Result<i32> {
        (**self).probe(invocation)
    }
}

/// Runs invocations as real child processes via [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.args());
        cmd
    }
}

impl Runner for SystemRunner {
    fn capture(&self, invocation: &Invocation) -> Result<InvocationResult> {
        tracing::debug!(%invocation, "capture");
        let out = Self::command(invocation)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(invocation, e))?;
        let result = InvocationResult {
            status: out.status.code().unwrap_or(SIGNALED),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        };
        if !result.success() {
            tracing::warn!(%invocation, status = result.status, "command failed");
        }
        Ok(result)
    }

    fn stream(&self, invocation: &Invocation) -> Result<i32> {
        tracing::debug!(%invocation, "stream");
        let status = Self::command(invocation)
            .status()
            .map_err(|e| spawn_error(invocation, e))?;
        let code = status.code().unwrap_or(SIGNALED);
        if code != 0 {
            tracing::warn!(%invocation, status = code, "command failed");
        }
        Ok(code)
    }

    fn probe(&self, invocation: &Invocation) -> Result<i32> {
        tracing::debug!(%invocation, "probe");
        let status = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| spawn_error(invocation, e))?;
        Ok(status.code().unwrap_or(SIGNALED))
    }
}

/// Maps a spawn failure, singling out a missing binary.
fn spawn_error(invocation: &Invocation, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        tracing::warn!(program = invocation.program(), "binary not found on PATH");
        Error::ToolMissing {
            program: invocation.program().to_owned(),
        }
    } else {
        Error::Io(err)
    }
}

#[cfg(any(test, feature = "testing"))]
pub use scripted::{Scripted, ScriptedRunner};

#[cfg(any(test, feature = "testing"))]
mod scripted {
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    use super::{Invocation, InvocationResult, Runner};
    use crate::{Error, Result};

    /// A queued response for [`ScriptedRunner`].
    #[derive(Debug, Clone)]
    pub enum Scripted {
        /// The process ran and exited with this result.
        Exit(InvocationResult),
        /// The binary was not found on `PATH`.
        Missing,
    }

    /// Fake runner returning queued responses in order and recording every
    /// invocation it receives.
    ///
    /// When the queue is empty each call succeeds with empty output.
    /// Interior mutability lets all methods take `&self`.
    #[derive(Debug, Default)]
    pub struct ScriptedRunner {
        responses: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl ScriptedRunner {
        /// Creates a runner with an empty queue.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a zero-exit response with the given stdout.
        #[must_use]
        pub fn ok(self, stdout: &str) -> Self {
            self.push(Scripted::Exit(InvocationResult {
                status: 0,
                stdout: stdout.to_owned(),
                stderr: String::new(),
            }))
        }

        /// Queues a non-zero response with the given stderr.
        #[must_use]
        pub fn fail(self, status: i32, stderr: &str) -> Self {
            self.push(Scripted::Exit(InvocationResult {
                status,
                stdout: String::new(),
                stderr: stderr.to_owned(),
            }))
        }

        /// Queues a binary-not-found response.
        #[must_use]
        pub fn missing(self) -> Self {
            self.push(Scripted::Missing)
        }

        /// Queues an arbitrary response.
        #[must_use]
        pub fn push(self, response: Scripted) -> Self {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(response);
            self
        }

        /// Every invocation received so far, in order.
        pub fn calls(&self) -> Vec<Invocation> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Argument vectors of every invocation received so far.
        pub fn argvs(&self) -> Vec<Vec<String>> {
            self.calls()
                .iter()
                .map(|c| c.argv().into_iter().map(str::to_owned).collect())
                .collect()
        }

        fn next(&self, invocation: &Invocation) -> Result<InvocationResult> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(invocation.clone());
            let response = self
                .responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            match response {
                Some(Scripted::Exit(result)) => Ok(result),
                Some(Scripted::Missing) => Err(Error::ToolMissing {
                    program: invocation.program().to_owned(),
                }),
                None => Ok(InvocationResult::default()),
            }
        }
    }

    impl Runner for ScriptedRunner {
        fn capture(&self, invocation: &Invocation) -> Result<InvocationResult> {
            self.next(invocation)
        }

        fn stream(&self, invocation: &Invocation) -> Result<i32> {
            self.next(invocation).map(|r| r.status)
        }

        fn probe(&self, invocation: &Invocation) -> Result<i32> {
            self.next(invocation).map(|r| r.status)
        }
    }
}
