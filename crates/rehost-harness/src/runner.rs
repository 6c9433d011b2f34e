//! Test execution engine.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use rehost_abi::errno_abi::errno;
use rehost_membrane::log::{LogEmitter, Outcome};
use rehost_membrane::{LogEntry, LogLevel};

use crate::execute::execute;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::verify::VerificationResult;
use crate::diff;

/// Prefix of the rendered result of a case that raised a usage error.
pub const PANIC_PREFIX: &str = "panic:";

/// Runs fixture sets and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    log: Option<LogEmitter>,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            log: None,
        }
    }

    /// Record one JSONL entry per case to `emitter`.
    #[must_use]
    pub fn with_log(mut self, emitter: LogEmitter) -> Self {
        self.log = Some(emitter);
        self
    }

    /// Run every case in `set`, in order.
    pub fn run(&mut self, set: &FixtureSet) -> Vec<VerificationResult> {
        let results: Vec<VerificationResult> = set
            .cases
            .iter()
            .map(|case| self.run_case(&set.family, case))
            .collect();
        if let Some(log) = self.log.as_mut() {
            // Logging is best effort; results are authoritative.
            let _ = log.flush();
        }
        results
    }

    fn run_case(&mut self, family: &str, case: &FixtureCase) -> VerificationResult {
        let start = Instant::now();
        let (actual, actual_errno) = run_isolated(case);
        let elapsed = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

        let passed = actual == case.expected_output && actual_errno == case.expected_errno;
        let diff = if passed {
            None
        } else if actual != case.expected_output {
            Some(diff::render_diff(&case.expected_output, &actual))
        } else {
            Some(format!(
                "errno: expected {}, got {actual_errno}",
                case.expected_errno
            ))
        };

        if let Some(log) = self.log.as_mut() {
            let entry = LogEntry::new(
                "",
                if passed { LogLevel::Info } else { LogLevel::Error },
                "fixture_case",
            )
            .with_api(family, case.function.as_str())
            .with_errno(actual_errno)
            .with_outcome(if passed { Outcome::Pass } else { Outcome::Fail })
            .with_latency_ns(elapsed)
            .with_details(serde_json::json!({
                "campaign": self.campaign,
                "case": case.name,
            }));
            let _ = log.emit_entry(entry);
        }

        VerificationResult {
            case_name: case.name.clone(),
            function: case.function.clone(),
            passed,
            expected: case.expected_output.clone(),
            actual,
            expected_errno: case.expected_errno,
            actual_errno,
            diff,
        }
    }
}

/// Execute one case, turning usage-error panics into `panic:<message>`
/// and malformed cases into `unsupported:<reason>`.
fn run_isolated(case: &FixtureCase) -> (String, i32) {
    let outcome = catch_unwind(AssertUnwindSafe(|| execute(&case.function, &case.inputs)));
    match outcome {
        Ok(Ok(out)) => (out, errno()),
        Ok(Err(err)) => (format!("unsupported:{err}"), errno()),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            (format!("{PANIC_PREFIX}{msg}"), errno())
        }
    }
}
