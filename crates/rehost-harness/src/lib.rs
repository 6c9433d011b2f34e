//! Conformance harness for the rehost runtime.
//!
//! This crate provides:
//! - Fixtures: JSON case sets naming a runtime entry point, its inputs and
//!   the expected rendering of the result
//! - Execution: drive the entry points from fixture inputs
//! - Verification: compare, diff and summarize
//! - Reports: markdown and JSON, with a SHA-256 digest of the JSON form

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod execute;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
