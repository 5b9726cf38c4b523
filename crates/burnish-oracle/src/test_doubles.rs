//! Scripted oracle doubles for exercising verification-driven logic
//! without a real toolchain.

use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};

use crate::diagnostic::{Diagnostic, Verdict};
use crate::error::OracleError;
use crate::oracle::VerificationOracle;

/// An oracle that replays a scripted sequence of verdicts.
///
/// Each call to `verify` consumes the next scripted verdict; once the
/// script is exhausted, the last verdict is repeated (matching the
/// idempotent re-verification property of a real oracle over an unchanged
/// tree). Every checked project path is recorded for assertions.
#[derive(Debug)]
pub struct ScriptedOracle {
    script: Mutex<Vec<Verdict>>,
    calls: Mutex<Vec<Utf8PathBuf>>,
}

impl ScriptedOracle {
    /// Creates an oracle replaying the given verdicts in order.
    ///
    /// # Panics
    ///
    /// Panics when the script is empty; a double with no verdict to give
    /// cannot satisfy the oracle contract.
    #[must_use]
    pub fn with_script(mut verdicts: Vec<Verdict>) -> Self {
        assert!(!verdicts.is_empty(), "scripted oracle needs a verdict");
        verdicts.reverse();
        Self {
            script: Mutex::new(verdicts),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates an oracle that always accepts.
    #[must_use]
    pub fn passing() -> Self {
        Self::with_script(vec![passing_verdict()])
    }

    /// Creates an oracle that always rejects.
    #[must_use]
    pub fn failing() -> Self {
        Self::with_script(vec![failing_verdict()])
    }

    /// Number of verifications performed so far.
    ///
    /// # Panics
    ///
    /// Panics when the call log mutex was poisoned by a panicking test.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call log lock").len()
    }

    /// The project paths verified so far, in order.
    ///
    /// # Panics
    ///
    /// Panics when the call log mutex was poisoned by a panicking test.
    #[must_use]
    pub fn calls(&self) -> Vec<Utf8PathBuf> {
        self.calls.lock().expect("call log lock").clone()
    }
}

impl VerificationOracle for ScriptedOracle {
    fn verify(&self, project: &Utf8Path) -> Result<Verdict, OracleError> {
        self.calls
            .lock()
            .expect("call log lock")
            .push(project.to_owned());
        let mut script = self.script.lock().expect("script lock");
        let verdict = if script.len() > 1 {
            script.pop().unwrap_or_else(passing_verdict)
        } else {
            script.last().cloned().unwrap_or_else(passing_verdict)
        };
        Ok(verdict)
    }
}

/// A verdict accepting the tree with no diagnostics.
#[must_use]
pub fn passing_verdict() -> Verdict {
    Verdict {
        success: true,
        output: String::new(),
        diagnostics: Vec::new(),
    }
}

/// A verdict accepting the tree with the given diagnostics attached.
#[must_use]
pub fn passing_verdict_with(diagnostics: Vec<Diagnostic>) -> Verdict {
    Verdict {
        success: true,
        output: String::new(),
        diagnostics,
    }
}

/// A verdict rejecting the tree.
#[must_use]
pub fn failing_verdict() -> Verdict {
    Verdict {
        success: false,
        output: String::from("error[E0133]: scripted failure\n"),
        diagnostics: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_is_consumed_in_order_and_last_verdict_repeats() {
        let oracle =
            ScriptedOracle::with_script(vec![failing_verdict(), passing_verdict()]);
        let project = Utf8Path::new("/tmp/demo");

        let first = oracle.verify(project).expect("verdict");
        let second = oracle.verify(project).expect("verdict");
        let third = oracle.verify(project).expect("verdict");

        assert!(!first.success);
        assert!(second.success);
        assert!(third.success);
        assert_eq!(oracle.call_count(), 3);
        assert_eq!(oracle.calls()[0], Utf8PathBuf::from("/tmp/demo"));
    }
}
