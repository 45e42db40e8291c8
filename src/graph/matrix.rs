use std::collections::HashSet;

use log::debug;

use super::model::{MatrixIdentity, ProjectedTask};
use super::projection::project_task_run;
use crate::tekton::{PipelineTask, TaskRunRecord};

/// True when a task executed more than once and every execution names its platform.
pub fn is_matrix_fan_out(runs: &[&TaskRunRecord]) -> bool {
    runs.len() > 1 && runs.iter().all(|tr| tr.platform().is_some())
}

/// Replaces every non-alphanumeric character with a hyphen.
pub fn sanitize_platform(platform: &str) -> String {
    platform
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Human-readable form of a platform label: `linux-x86_64` becomes `linux/x86_64`.
pub fn display_platform(platform: &str) -> String {
    platform.replacen('-', "/", 1)
}

/// Emits one projected entry per `TaskRun` of a fanned-out task.
///
/// Entries are named `<task>-<platform>`. When the platform label is missing, has
/// no alphanumeric content, or would collide with another name, the entry falls
/// back to `<task>-<index>`.
pub fn expand_matrix<'a>(
    task: &'a PipelineTask,
    runs: &[&'a TaskRunRecord],
    reserved: &HashSet<&str>,
) -> Vec<ProjectedTask<'a>> {
    let mut used: HashSet<String> = HashSet::new();

    runs.iter()
        .enumerate()
        .map(|(index, &task_run)| {
            let platform = task_run.platform();
            let candidate = platform
                .map(sanitize_platform)
                .filter(|s| s.chars().any(|c| c.is_ascii_alphanumeric()))
                .map(|s| format!("{}-{s}", task.name))
                .filter(|name| !used.contains(name) && !reserved.contains(name.as_str()));

            let name = candidate.unwrap_or_else(|| {
                debug!(
                    "Falling back to index suffix for matrix instance {index} of {}",
                    task.name
                );
                index_name(&task.name, index, &used, reserved)
            });
            used.insert(name.clone());

            let identity = MatrixIdentity {
                original_name: task.name.clone(),
                matrix_platform: platform.map(display_platform),
            };
            project_task_run(task, name, task_run, Some(identity))
        })
        .collect()
}

fn index_name(
    base: &str,
    index: usize,
    used: &HashSet<String>,
    reserved: &HashSet<&str>,
) -> String {
    (index..)
        .map(|i| format!("{base}-{i}"))
        .find(|name| !used.contains(name) && !reserved.contains(name.as_str()))
        .unwrap_or_else(|| format!("{base}-{index}"))
}
