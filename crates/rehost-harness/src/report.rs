//! Report generation for conformance results.

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::verify::VerificationSummary;

/// A conformance report over one or more fixture sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub title: String,
    /// Fixture families included.
    pub families: Vec<String>,
    pub timestamp: String,
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Families: {}\n", self.families.join(", ")));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Case | Function | Status |\n");
        out.push_str("|------|----------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("| {} | {} | {} |\n", r.case_name, r.function, status));
        }
        for r in self.summary.results.iter().filter(|r| !r.passed) {
            if let Some(diff) = &r.diff {
                out.push_str(&format!("\n## {}\n\n```\n{diff}\n```\n", r.case_name));
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    /// Lowercase hex SHA-256 of [`to_json`](Self::to_json), for artifact
    /// integrity checks.
    #[must_use]
    pub fn digest(&self) -> String {
        hex_lower(&sha2::Sha256::digest(self.to_json().as_bytes()))
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerificationResult;

    fn report(passed: bool) -> ConformanceReport {
        let result = VerificationResult {
            case_name: "len".into(),
            function: "strlen".into(),
            passed,
            expected: "3".into(),
            actual: if passed { "3".into() } else { "4".into() },
            expected_errno: 0,
            actual_errno: 0,
            diff: (!passed).then(|| "-3\n+4".to_string()),
        };
        ConformanceReport {
            title: "t".into(),
            families: vec!["string".into()],
            timestamp: "now".into(),
            summary: VerificationSummary::from_results(vec![result]),
        }
    }

    #[test]
    fn markdown_lists_cases_and_failures() {
        let md = report(false).to_markdown();
        assert!(md.contains("| len | strlen | FAIL |"));
        assert!(md.contains("## len"));
        assert!(!report(true).to_markdown().contains("## len"));
    }

    #[test]
    fn digest_is_stable_hex() {
        let r = report(true);
        let d = r.digest();
        assert_eq!(d.len(), 64);
        assert!(d.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(d, r.digest());
        assert_ne!(d, report(false).digest());
    }
}
