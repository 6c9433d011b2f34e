//! Fixture loading and management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::HarnessError;

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Runtime entry point being exercised.
    pub function: String,
    /// Input parameters, interpreted per function.
    pub inputs: serde_json::Value,
    /// Expected rendering of the result.
    pub expected_output: String,
    /// Expected `errno` after the call.
    #[serde(default)]
    pub expected_errno: i32,
}

/// A collection of fixture cases for one family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

/// The `*.json` files directly inside `dir`, sorted.
pub fn fixture_paths(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let entries = std::fs::read_dir(dir).map_err(|source| HarnessError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_defaults_to_zero() {
        let set = FixtureSet::from_json(
            r#"{"version":"v1","family":"string","cases":[
                {"name":"len","function":"strlen","inputs":{"s":"abc"},"expected_output":"3"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(set.cases.len(), 1);
        assert_eq!(set.cases[0].expected_errno, 0);
        let again = FixtureSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(again.cases[0].name, "len");
    }

    #[test]
    fn malformed_json_is_a_fixture_error() {
        let err = FixtureSet::from_json("{").unwrap_err();
        assert!(err.is_fixture_error());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FixtureSet::from_file(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(!err.is_fixture_error());
        assert!(err.to_string().contains("/nonexistent/fixture.json"));
    }
}
