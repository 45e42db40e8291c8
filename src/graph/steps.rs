use std::collections::HashMap;

use super::model::{StepRunStatus, StepStatus};
use crate::tekton::{RunStatus, StepState};

/// Termination reason of a step container that exited normally.
const COMPLETED: &str = "Completed";

/// Derives one status per declared step of a task.
///
/// `task_reason` is `None` when the owning task has no execution status at all,
/// in which case every step is reported as cancelled.
pub fn derive_step_statuses(
    declared: &[&str],
    records: &[StepState],
    task_reason: Option<RunStatus>,
) -> Vec<StepStatus> {
    let by_name: HashMap<&str, &StepState> =
        records.iter().map(|r| (r.name.as_str(), r)).collect();

    declared
        .iter()
        .enumerate()
        .map(|(index, &name)| {
            let record = by_name.get(name).copied();
            let previous = index
                .checked_sub(1)
                .and_then(|i| by_name.get(declared[i]).copied());
            let is_last = index + 1 == declared.len();

            StepStatus {
                name: name.to_string(),
                status: step_status(record, previous, index == 0, is_last, task_reason),
                start_time: record.and_then(|r| {
                    r.running
                        .as_ref()
                        .and_then(|s| s.started_at)
                        .or_else(|| r.terminated.as_ref().and_then(|t| t.started_at))
                }),
                end_time: record.and_then(|r| r.terminated.as_ref().and_then(|t| t.finished_at)),
            }
        })
        .collect()
}

fn step_status(
    record: Option<&StepState>,
    previous: Option<&StepState>,
    is_first: bool,
    is_last: bool,
    task_reason: Option<RunStatus>,
) -> StepRunStatus {
    let Some(task_reason) = task_reason else {
        return StepRunStatus::Cancelled;
    };
    let Some(record) = record else {
        return StepRunStatus::Pending;
    };

    if let Some(terminated) = &record.terminated {
        if task_reason == RunStatus::TestFailed && is_last {
            return StepRunStatus::TestFailed;
        }
        return if terminated.reason.as_deref() == Some(COMPLETED) {
            StepRunStatus::Succeeded
        } else {
            StepRunStatus::Failed
        };
    }

    if record.running.is_some() {
        let predecessor_done = previous.is_some_and(|p| p.terminated.is_some());
        return if is_first || predecessor_done {
            StepRunStatus::Running
        } else {
            StepRunStatus::Pending
        };
    }

    StepRunStatus::Pending
}
