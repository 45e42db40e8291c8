use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::tekton::PipelineTask;

/// Matches `$(tasks.<task>.results.<result>)`, capturing the task name.
static RESULT_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\(tasks\.([A-Za-z0-9][A-Za-z0-9_-]*)\.results\.[^)\s]+\)")
        .expect("result reference pattern is valid")
});

/// Task names referenced through result references in `value`, in first-seen order.
pub fn extract_task_references(value: &str) -> Vec<String> {
    let mut names = IndexSet::new();
    for captures in RESULT_REFERENCE.captures_iter(value) {
        if let Some(name) = captures.get(1) {
            names.insert(name.as_str().to_string());
        }
    }
    names.into_iter().collect()
}

/// Raw dependency set of a pipeline task: explicit `runAfter` entries followed by
/// every task referenced from params, matrix params and `when` expressions.
pub fn task_dependencies(task: &PipelineTask) -> Vec<String> {
    let mut deps: IndexSet<String> = task.run_after.iter().cloned().collect();

    let matrix_params = task.matrix.iter().flat_map(|m| m.params.iter());
    let param_strings = task
        .params
        .iter()
        .chain(matrix_params)
        .flat_map(|p| p.value.strings());
    let when_strings = task.when.iter().flat_map(|w| {
        std::iter::once(w.input.as_str()).chain(w.values.iter().map(String::as_str))
    });

    for value in param_strings.chain(when_strings) {
        deps.extend(extract_task_references(value));
    }

    deps.shift_remove(task.name.as_str());
    deps.into_iter().collect()
}
