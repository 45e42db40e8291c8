use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::Condition;

/// Display status of a pipeline run or of a single task within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    Succeeded,
    Failed,
    Running,
    #[serde(rename = "In Progress")]
    InProgress,
    FailedToStart,
    PipelineNotStarted,
    Skipped,
    Cancelled,
    Cancelling,
    Pending,
    Idle,
    TestWarning,
    TestFailed,
}

impl RunStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Running => "Running",
            Self::InProgress => "In Progress",
            Self::FailedToStart => "Failed To Start",
            Self::PipelineNotStarted => "Pipeline Not Started",
            Self::Skipped => "Skipped",
            Self::Cancelled => "Cancelled",
            Self::Cancelling => "Cancelling",
            Self::Pending => "Pending",
            Self::Idle => "Idle",
            Self::TestWarning => "Test Warnings",
            Self::TestFailed => "Test Failures",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const CANCELLED_REASONS: &[&str] = &[
    "Cancelled",
    "PipelineRunCancelled",
    "StoppedRunFinally",
    "CancelledRunFinally",
    "TaskRunCancelled",
];

const PENDING_REASONS: &[&str] = &["Pending", "PipelineRunPending"];

const STOPPING_REASONS: &[&str] = &[
    "PipelineRunStopping",
    "CancelledRunFinally",
    "StoppedRunFinally",
];

/// Reduces the `Succeeded` condition of a run to a display status.
///
/// Returns `None` when no `Succeeded` condition has been reported yet.
pub fn status_from_conditions(conditions: &[Condition]) -> Option<RunStatus> {
    let condition = conditions.iter().find(|c| c.type_ == "Succeeded")?;
    let reason = condition.reason.as_deref().unwrap_or_default();

    let status = match condition.status.as_str() {
        "True" => RunStatus::Succeeded,
        "False" if CANCELLED_REASONS.contains(&reason) => RunStatus::Cancelled,
        "False" if PENDING_REASONS.contains(&reason) => RunStatus::Pending,
        "False" if reason == "CouldntGetTask" || reason == "TaskRunImagePullFailed" => {
            RunStatus::FailedToStart
        }
        "False" => RunStatus::Failed,
        _ if STOPPING_REASONS.contains(&reason) => RunStatus::Cancelling,
        _ if PENDING_REASONS.contains(&reason) => RunStatus::Pending,
        _ => RunStatus::Running,
    };

    Some(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(status: &str, reason: Option<&str>) -> Vec<Condition> {
        vec![Condition {
            type_: "Succeeded".to_string(),
            status: status.to_string(),
            reason: reason.map(ToString::to_string),
            message: None,
        }]
    }

    #[test]
    fn test_no_conditions_yields_none() {
        assert_eq!(status_from_conditions(&[]), None);
    }

    #[test]
    fn test_true_is_succeeded() {
        assert_eq!(
            status_from_conditions(&condition("True", Some("Succeeded"))),
            Some(RunStatus::Succeeded)
        );
    }

    #[test]
    fn test_false_reasons() {
        assert_eq!(
            status_from_conditions(&condition("False", Some("Failed"))),
            Some(RunStatus::Failed)
        );
        assert_eq!(
            status_from_conditions(&condition("False", Some("PipelineRunCancelled"))),
            Some(RunStatus::Cancelled)
        );
        assert_eq!(
            status_from_conditions(&condition("False", Some("PipelineRunPending"))),
            Some(RunStatus::Pending)
        );
        assert_eq!(
            status_from_conditions(&condition("False", Some("CouldntGetTask"))),
            Some(RunStatus::FailedToStart)
        );
    }

    #[test]
    fn test_unknown_reasons() {
        assert_eq!(
            status_from_conditions(&condition("Unknown", Some("Running"))),
            Some(RunStatus::Running)
        );
        assert_eq!(
            status_from_conditions(&condition("Unknown", Some("PipelineRunStopping"))),
            Some(RunStatus::Cancelling)
        );
        assert_eq!(
            status_from_conditions(&condition("Unknown", None)),
            Some(RunStatus::Running)
        );
    }

    #[test]
    fn test_ignores_other_condition_types() {
        let conditions = vec![Condition {
            type_: "Ready".to_string(),
            status: "True".to_string(),
            ..Condition::default()
        }];
        assert_eq!(status_from_conditions(&conditions), None);
    }
}
