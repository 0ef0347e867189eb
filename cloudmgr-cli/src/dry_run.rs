//! `--dry-run`: print invocations instead of executing them.

use cloudmgr::{Invocation, InvocationResult, Result, Runner};

/// Runner that echoes each invocation to stderr and reports success with
/// empty output.
///
/// Empty output means lookups that parse engine output (such as the
/// container check before `docker start`) find nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl DryRun {
    fn announce(invocation: &Invocation) {
        eprintln!("+ {invocation}");
    }
}

impl Runner for DryRun {
    fn capture(&self, invocation: &Invocation) -> Result<InvocationResult> {
        Self::announce(invocation);
        Ok(InvocationResult::default())
    }

    fn stream(&self, invocation: &Invocation) -> Result<i32> {
        Self::announce(invocation);
        Ok(0)
    }

    fn probe(&self, invocation: &Invocation) -> Result<i32> {
        Self::announce(invocation);
        Ok(0)
    }
}
