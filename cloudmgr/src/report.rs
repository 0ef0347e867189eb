//! Turning a captured process result into user-facing text.

use std::fmt;

use crate::InvocationResult;

/// Prefix printed before the error stream of a failed invocation.
pub const FAILURE_PREFIX: &str = "Operation failed: ";

/// How much of the captured output the operation expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single-line confirmation (e.g. a container id); trailing
    /// whitespace is trimmed.
    Line,
    /// Multi-line output (e.g. build logs); kept verbatim.
    Block,
}

/// Outcome of a captured invocation, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The process exited zero; holds its standard output.
    Success(String),
    /// The process exited non-zero; holds its standard error.
    Failure {
        /// Exit status.
        status: i32,
        /// Standard error text.
        stderr: String,
    },
}

impl Report {
    /// Derives a report from `result`, trimming per `shape`.
    ///
    /// No retries: the invocation already happened exactly once.
    pub fn from_result(result: &InvocationResult, shape: Shape) -> Self {
        let shaped = |s: &str| match shape {
            Shape::Line => s.trim_end().to_owned(),
            Shape::Block => s.to_owned(),
        };
        if result.success() {
            Self::Success(shaped(&result.stdout))
        } else {
            Self::Failure {
                status: result.status,
                stderr: shaped(&result.stderr),
            }
        }
    }

    /// Returns `true` for [`Report::Success`].
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(out) => f.write_str(out),
            Self::Failure { stderr, .. } => write!(f, "{FAILURE_PREFIX}{stderr}"),
        }
    }
}
