use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::matrix::{expand_matrix, is_matrix_fan_out};
use super::model::{MatrixIdentity, ProjectedTask, TaskStatus};
use super::steps::derive_step_statuses;
use crate::tekton::{
    status_from_conditions, PipelineRunRecord, PipelineSpec, PipelineTask, RunStatus,
    TaskRunRecord, TaskRunResults, TaskRunStatus,
};

/// Shared inputs for projecting every task of one pipeline run snapshot.
pub struct ProjectionContext<'a> {
    pipeline_run: &'a PipelineRunRecord,
    run_status: Option<RunStatus>,
    task_runs: &'a [TaskRunRecord],
    reserved_names: HashSet<&'a str>,
}

impl<'a> ProjectionContext<'a> {
    pub fn new(
        pipeline_run: &'a PipelineRunRecord,
        task_runs: &'a [TaskRunRecord],
        spec: &'a PipelineSpec,
    ) -> Self {
        let run_status = pipeline_run
            .status
            .as_ref()
            .and_then(|s| status_from_conditions(&s.conditions));
        let reserved_names = spec
            .tasks
            .iter()
            .chain(&spec.finally)
            .map(|t| t.name.as_str())
            .collect();

        Self {
            pipeline_run,
            run_status,
            task_runs,
            reserved_names,
        }
    }

    /// Static task names that expanded instances must not collide with.
    pub fn reserved_names(&self) -> &HashSet<&'a str> {
        &self.reserved_names
    }

    /// Projects one static task onto the runtime records, fanning out when it ran
    /// once per platform.
    pub fn project(&self, task: &'a PipelineTask) -> Vec<ProjectedTask<'a>> {
        let Some(run_status) = self.run_status else {
            return vec![unexecuted(task, RunStatus::Pending)];
        };

        if self.task_runs.is_empty() {
            return vec![unexecuted(task, run_status)];
        }

        let matching: Vec<&'a TaskRunRecord> = self
            .task_runs
            .iter()
            .filter(|tr| tr.pipeline_task_name() == Some(task.name.as_str()))
            .collect();

        match matching.as_slice() {
            [] if self.pipeline_run.is_skipped(&task.name) => {
                vec![unexecuted(task, RunStatus::Skipped)]
            }
            [] => vec![unexecuted(task, RunStatus::Idle)],
            runs if is_matrix_fan_out(runs) => expand_matrix(task, runs, &self.reserved_names),
            [first, ..] => vec![project_task_run(task, task.name.clone(), *first, None)],
        }
    }
}

fn unexecuted(task: &PipelineTask, reason: RunStatus) -> ProjectedTask<'_> {
    ProjectedTask {
        name: task.name.clone(),
        task,
        status: TaskStatus::new(reason),
        steps: Vec::new(),
        matrix: None,
        task_run: None,
    }
}

/// Projects a single `TaskRun` onto `task`, under the (possibly synthesized) `name`.
pub(crate) fn project_task_run<'a>(
    task: &'a PipelineTask,
    name: String,
    task_run: &'a TaskRunRecord,
    matrix: Option<MatrixIdentity>,
) -> ProjectedTask<'a> {
    let run_status = task_run.status.as_ref();
    let execution_reason = run_status.and_then(|s| status_from_conditions(&s.conditions));

    let mut status = TaskStatus::new(RunStatus::Pending);
    if let Some(run_status) = run_status {
        apply_run_status(&mut status, run_status, execution_reason);
    }

    let records = run_status.map(|s| s.steps.as_slice()).unwrap_or_default();
    let steps = derive_step_statuses(
        &task_run.declared_steps(),
        records,
        execution_reason.map(|_| status.reason),
    );

    ProjectedTask {
        name,
        task,
        status,
        steps,
        matrix,
        task_run: Some(task_run),
    }
}

fn apply_run_status(
    status: &mut TaskStatus,
    run_status: &TaskRunStatus,
    execution_reason: Option<RunStatus>,
) {
    let results = TaskRunResults::detect(run_status);
    let test_output = results.test_output();

    status.reason = match (execution_reason, &test_output) {
        (Some(RunStatus::Succeeded), Some(output)) if output.is_failure() => RunStatus::TestFailed,
        (Some(RunStatus::Succeeded), Some(output)) if output.is_warning() => {
            RunStatus::TestWarning
        }
        (Some(reason), _) => reason,
        (None, _) => RunStatus::Pending,
    };

    if let (Some(start), Some(end)) = (run_status.start_time, run_status.completion_time) {
        status.duration = Some(format_duration(start, end));
    }

    if let Some(output) = test_output {
        status.test_fail_count = output.failures;
        status.test_warn_count = output.warnings;
    }
    status.scan_results = results.scan_results();
}

/// Formats the span between two timestamps as e.g. `1h 2m 3s`.
pub fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let total = (end - start).num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
