//! CLI entrypoint for the rehost conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rehost_harness::fixtures::fixture_paths;
use rehost_harness::{ConformanceReport, FixtureSet, TestRunner, VerificationSummary};
use rehost_membrane::log::LogEmitter;

/// Conformance tooling for the rehost runtime.
#[derive(Debug, Parser)]
#[command(name = "rehost-harness")]
#[command(about = "Conformance testing harness for the rehost runtime")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run fixture sets against the runtime.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown); JSON is written alongside.
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSONL log of every executed case.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// List the cases in a fixture directory.
    List {
        #[arg(long)]
        fixture: PathBuf,
    },
    /// Print the functions fixtures may name.
    Functions,
}

fn load_sets(dir: &std::path::Path) -> Result<Vec<FixtureSet>, Box<dyn std::error::Error>> {
    let mut sets = Vec::new();
    for path in fixture_paths(dir)? {
        match FixtureSet::from_file(&path) {
            Ok(set) => sets.push(set),
            Err(err) => eprintln!("Skipping {}: {err}", path.display()),
        }
    }
    if sets.is_empty() {
        return Err(format!("No fixture JSON files found in {}", dir.display()).into());
    }
    Ok(sets)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            report,
            log,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let sets = load_sets(&fixture)?;

            let mut runner = TestRunner::new("fixture-verify");
            if let Some(path) = &log {
                runner = runner.with_log(LogEmitter::to_file(path, "fixture-verify")?);
            }
            let mut results = Vec::new();
            for set in &sets {
                results.extend(runner.run(set));
            }

            let report_doc = ConformanceReport {
                title: String::from("rehost Conformance Report"),
                families: sets.iter().map(|s| s.family.clone()).collect(),
                timestamp: format!("{:?}", std::time::SystemTime::now()),
                summary: VerificationSummary::from_results(results),
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
                eprintln!("sha256 {}  {}", report_doc.digest(), json_path.display());
            }

            if !report_doc.summary.all_passed() {
                for r in report_doc.summary.results.iter().filter(|r| !r.passed) {
                    eprintln!("FAIL {} ({})", r.case_name, r.function);
                }
                return Err("Conformance verification failed".into());
            }
        }
        Command::List { fixture } => {
            for set in load_sets(&fixture)? {
                for case in &set.cases {
                    println!("{}\t{}\t{}", set.family, case.function, case.name);
                }
            }
        }
        Command::Functions => {
            for name in rehost_harness::execute::SUPPORTED {
                println!("{name}");
            }
        }
    }

    Ok(())
}
