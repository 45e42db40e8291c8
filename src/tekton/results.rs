use log::warn;
use serde::{Deserialize, Serialize};

use super::types::{TaskRunResult, TaskRunStatus};

/// Result names that have carried test outcomes.
pub const TEST_OUTPUT_RESULTS: &[&str] = &["TEST_OUTPUT", "HACBS_TEST_OUTPUT"];
/// Result names that have carried vulnerability scan summaries.
pub const SCAN_RESULTS: &[&str] = &["CLAIR_SCAN_RESULT", "SCAN_OUTPUT"];

/// Task results as found on a `TaskRun`, tagged by the API generation that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskRunResults<'a> {
    /// `status.results` (`tekton.dev/v1`).
    V1(&'a [TaskRunResult]),
    /// `status.taskResults` (`tekton.dev/v1beta1`).
    V1Beta1(&'a [TaskRunResult]),
    Absent,
}

impl<'a> TaskRunResults<'a> {
    pub fn detect(status: &'a TaskRunStatus) -> Self {
        match (&status.results, &status.task_results) {
            (Some(v1), _) if !v1.is_empty() => Self::V1(v1),
            (_, Some(v1beta1)) if !v1beta1.is_empty() => Self::V1Beta1(v1beta1),
            (Some(v1), None) => Self::V1(v1),
            _ => Self::Absent,
        }
    }

    pub fn entries(self) -> &'a [TaskRunResult] {
        match self {
            Self::V1(entries) | Self::V1Beta1(entries) => entries,
            Self::Absent => &[],
        }
    }

    /// First entry whose name is one of `names`.
    pub fn find(self, names: &[&str]) -> Option<&'a TaskRunResult> {
        self.entries()
            .iter()
            .find(|r| names.contains(&r.name.as_str()))
    }

    pub fn test_output(self) -> Option<TestOutput> {
        self.find(TEST_OUTPUT_RESULTS).and_then(parse_payload)
    }

    pub fn scan_results(self) -> Option<ScanResults> {
        self.find(SCAN_RESULTS).and_then(parse_payload)
    }
}

/// Payload of a test-output result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestOutput {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub failures: Option<u32>,
    #[serde(default)]
    pub warnings: Option<u32>,
    #[serde(default)]
    pub successes: Option<u32>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TestOutput {
    pub fn is_failure(&self) -> bool {
        self.result.as_deref() == Some("FAILURE")
    }

    pub fn is_warning(&self) -> bool {
        self.result.as_deref() == Some("WARNING")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerabilities {
    #[serde(default)]
    pub critical: u32,
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
    #[serde(default)]
    pub unknown: u32,
}

impl Vulnerabilities {
    pub fn total(&self) -> u32 {
        [self.high, self.medium, self.low, self.unknown]
            .into_iter()
            .fold(self.critical, u32::saturating_add)
    }
}

/// Payload of a vulnerability scan result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResults {
    #[serde(default)]
    pub vulnerabilities: Vulnerabilities,
}

fn parse_payload<T: serde::de::DeserializeOwned>(result: &TaskRunResult) -> Option<T> {
    let Some(raw) = result.value.as_str() else {
        warn!("Result {} does not hold a string payload", result.name);
        return None;
    };

    serde_json::from_str(raw)
        .inspect_err(|e| warn!("Failed to parse result {}: {e}", result.name))
        .ok()
}
