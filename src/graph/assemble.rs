use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};

use super::badge::{badge_count, badge_width};
use super::dependencies::task_dependencies;
use super::layout::LayoutConfig;
use super::model::{
    Edge, FinallyGroup, GraphModel, GraphNode, LayoutMetadata, NodeData, NodeType, ProjectedTask,
    WhenStatus,
};
use super::projection::ProjectionContext;
use crate::tekton::{
    PipelineDefinition, PipelineRunRecord, PipelineSpec, PipelineTask, RunStatus, TaskRunRecord,
};

pub const FINALLY_GROUP_ID: &str = "finally-group";

/// Builds the execution graph of one pipeline run snapshot.
///
/// The pipeline spec is taken from the run's status, falling back to the static
/// `pipeline`. Returns `None` when neither a pipeline name nor a pipeline spec can
/// be resolved; every other gap in the runtime data degrades to a defined status.
///
/// The result depends only on its inputs: the same snapshot always yields the
/// same nodes and edges, in the same order.
pub fn build_graph<'a>(
    pipeline: Option<&'a PipelineDefinition>,
    pipeline_run: &'a PipelineRunRecord,
    task_runs: &'a [TaskRunRecord],
    layout: &LayoutConfig,
) -> Option<GraphModel<'a>> {
    let Some(pipeline_name) = pipeline_run
        .pipeline_name()
        .or_else(|| pipeline.and_then(|p| p.metadata.name.as_deref()))
    else {
        debug!("No pipeline name on the pipeline run, skipping graph");
        return None;
    };
    let Some(spec) = resolve_spec(pipeline, pipeline_run) else {
        debug!("No pipeline spec for {pipeline_name}, skipping graph");
        return None;
    };

    let ctx = ProjectionContext::new(pipeline_run, task_runs, spec);

    let mut regular = Vec::new();
    let mut raw_deps = Vec::new();
    for task in &spec.tasks {
        let deps = task_dependencies(task);
        for projected in ctx.project(task) {
            regular.push(projected);
            raw_deps.push(deps.clone());
        }
    }
    let finally: Vec<ProjectedTask<'a>> = spec
        .finally
        .iter()
        .flat_map(|t| ctx.project(t))
        .collect();

    let resolved = resolve_dependencies(&regular, &raw_deps);
    let pruned = prune_transitive(&resolved);
    let levels = assign_levels(&pruned);

    let widths: Vec<u32> = regular.iter().map(|p| natural_width(p, layout)).collect();
    let mut level_widths: BTreeMap<usize, u32> = BTreeMap::new();
    for (&level, &width) in levels.iter().zip(&widths) {
        let entry = level_widths.entry(level).or_insert(0);
        *entry = (*entry).max(width);
    }

    let ids: Vec<String> = regular.iter().map(|p| p.name.clone()).collect();
    let mut nodes: Vec<GraphNode<'a>> = regular
        .into_iter()
        .zip(&pruned)
        .zip(&levels)
        .map(|((projected, deps), &level)| {
            let run_after = deps.iter().map(|&d| ids[d].clone()).collect();
            let width = level_widths.get(&level).copied().unwrap_or_default();
            to_node(projected, NodeType::Task, run_after, level, width, layout)
        })
        .collect();

    let (spacers, mut edges) = derive_edges(&nodes);

    let finally_group = (!finally.is_empty()).then(|| {
        let width = finally
            .iter()
            .map(|p| natural_width(p, layout))
            .max()
            .unwrap_or_default();

        for node in nodes.iter().filter(|n| n.level == 0) {
            edges.push(Edge::new(&node.id, FINALLY_GROUP_ID));
        }

        FinallyGroup {
            id: FINALLY_GROUP_ID.to_string(),
            children: finally.iter().map(|p| p.name.clone()).collect(),
            width,
        }
    });
    let finally_width = finally_group.as_ref().map_or(0, |g| g.width);

    nodes.extend(spacers);
    nodes.extend(
        finally
            .into_iter()
            .map(|p| to_node(p, NodeType::FinallyTask, Vec::new(), 0, finally_width, layout)),
    );

    Some(GraphModel {
        id: pipeline_run
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| pipeline_name.to_string()),
        nodes,
        edges,
        finally_group,
        layout: LayoutMetadata {
            max_level: levels.iter().copied().max().unwrap_or(0),
            node_height: layout.node_height,
            level_widths,
        },
    })
}

fn resolve_spec<'a>(
    pipeline: Option<&'a PipelineDefinition>,
    pipeline_run: &'a PipelineRunRecord,
) -> Option<&'a PipelineSpec> {
    pipeline_run
        .status
        .as_ref()
        .and_then(|s| s.pipeline_spec.as_ref())
        .or_else(|| pipeline.and_then(|p| p.spec.as_ref()))
}

fn natural_width(projected: &ProjectedTask<'_>, layout: &LayoutConfig) -> u32 {
    let badge = badge_width(badge_count(&projected.status), layout);
    layout.node_width(&projected.name, badge)
}

/// Maps raw dependency names onto node indices.
///
/// A name with no node of its own is resolved through the original name of
/// expanded matrix instances, so a dependency on a fanned-out task becomes a
/// dependency on every instance. Instances of one task never depend on each other.
fn resolve_dependencies(
    entries: &[ProjectedTask<'_>],
    raw_deps: &[Vec<String>],
) -> Vec<Vec<usize>> {
    let by_id: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name.as_str(), i))
        .collect();

    let mut by_original: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, projected) in entries.iter().enumerate() {
        if projected.matrix.is_some() {
            by_original
                .entry(projected.original_name())
                .or_default()
                .push(i);
        }
    }

    entries
        .iter()
        .zip(raw_deps)
        .map(|(projected, raw)| {
            let mut deps = IndexSet::new();
            for dep in raw.iter().filter(|d| d.as_str() != projected.original_name()) {
                if let Some(&index) = by_id.get(dep.as_str()) {
                    deps.insert(index);
                } else if let Some(instances) = by_original.get(dep.as_str()) {
                    deps.extend(instances.iter().copied());
                } else {
                    debug!("Dropping dependency {dep} of {}: no such task", projected.name);
                }
            }
            deps.into_iter().collect()
        })
        .collect()
}

/// Everything reachable from `start` by following dependencies, excluding `start`
/// unless it sits on a cycle.
fn reachable(start: usize, deps: &[Vec<usize>]) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut stack: Vec<usize> = deps[start].clone();
    while let Some(next) = stack.pop() {
        if seen.insert(next) {
            stack.extend(deps[next].iter().copied());
        }
    }
    seen
}

/// Removes every dependency already implied through another dependency of the same node.
fn prune_transitive(deps: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let closures: Vec<HashSet<usize>> = (0..deps.len()).map(|i| reachable(i, deps)).collect();

    deps.iter()
        .map(|direct| {
            direct
                .iter()
                .copied()
                .filter(|&d| {
                    !direct
                        .iter()
                        .any(|&e| e != d && closures[e].contains(&d) && !closures[d].contains(&e))
                })
                .collect()
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Visit {
    Pending,
    Active,
    Done(usize),
}

/// Level 0 for nodes nothing depends on, otherwise one more than the deepest dependent.
fn assign_levels(deps: &[Vec<usize>]) -> Vec<usize> {
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); deps.len()];
    for (node, node_deps) in deps.iter().enumerate() {
        for &dep in node_deps {
            dependents[dep].push(node);
        }
    }

    let mut state = vec![Visit::Pending; deps.len()];
    (0..deps.len())
        .map(|node| level_of(node, &dependents, &mut state))
        .collect()
}

fn level_of(node: usize, dependents: &[Vec<usize>], state: &mut [Visit]) -> usize {
    match state[node] {
        Visit::Done(level) => return level,
        Visit::Active => {
            warn!("Dependency cycle through node {node}, cutting it at this edge");
            return 0;
        }
        Visit::Pending => {}
    }

    state[node] = Visit::Active;
    let level = dependents[node]
        .iter()
        .map(|&dependent| level_of(dependent, dependents, state) + 1)
        .max()
        .unwrap_or(0);
    state[node] = Visit::Done(level);
    level
}

fn when_status(task: &PipelineTask, reason: RunStatus) -> Option<WhenStatus> {
    if task.when.is_empty() {
        return None;
    }
    match reason {
        RunStatus::Succeeded
        | RunStatus::Failed
        | RunStatus::TestFailed
        | RunStatus::TestWarning => Some(WhenStatus::Met),
        RunStatus::Skipped
        | RunStatus::Idle
        | RunStatus::Pending
        | RunStatus::Running
        | RunStatus::InProgress => Some(WhenStatus::Unmet),
        _ => None,
    }
}

fn to_node<'a>(
    projected: ProjectedTask<'a>,
    node_type: NodeType,
    run_after_tasks: Vec<String>,
    level: usize,
    width: u32,
    layout: &LayoutConfig,
) -> GraphNode<'a> {
    let when_status = when_status(projected.task, projected.status.reason);
    let badge_count = badge_count(&projected.status);

    GraphNode {
        id: projected.name.clone(),
        label: projected.name,
        node_type,
        run_after_tasks,
        level,
        width,
        height: layout.node_height,
        data: Some(NodeData {
            status: projected.status,
            steps: projected.steps,
            when_status,
            badge_count,
            task_ref: projected.task.task_ref.as_ref().and_then(|r| r.name.clone()),
            matrix: projected.matrix,
            task_run: projected.task_run,
        }),
    }
}

/// Derives the edge list in one pass over the regular nodes.
///
/// When two or more nodes share the same set of two or more parents, a spacer node
/// is inserted so the renderer draws a single merge point instead of a mesh.
fn derive_edges<'a>(nodes: &[GraphNode<'a>]) -> (Vec<GraphNode<'a>>, Vec<Edge>) {
    let levels: HashMap<&str, usize> = nodes.iter().map(|n| (n.id.as_str(), n.level)).collect();

    let mut groups: IndexMap<Vec<&str>, usize> = IndexMap::new();
    for node in nodes.iter().filter(|n| n.run_after_tasks.len() > 1) {
        *groups.entry(parent_key(node)).or_default() += 1;
    }

    let mut spacers: IndexMap<String, GraphNode<'a>> = IndexMap::new();
    let mut edges = Vec::new();

    for node in nodes {
        let key = parent_key(node);
        if groups.get(&key).is_some_and(|&children| children > 1) {
            let spacer_id = key.join("|");
            if !spacers.contains_key(&spacer_id) {
                for parent in &key {
                    edges.push(Edge::new(parent, &spacer_id));
                }
                let level = key
                    .iter()
                    .filter_map(|p| levels.get(p))
                    .min()
                    .map_or(0, |l| l.saturating_sub(1));
                spacers.insert(spacer_id.clone(), spacer_node(&spacer_id, &key, level));
            }
            edges.push(Edge::new(&spacer_id, &node.id));
        } else {
            for dep in &node.run_after_tasks {
                edges.push(Edge::new(dep, &node.id));
            }
        }
    }

    (spacers.into_values().collect(), edges)
}

fn parent_key<'n>(node: &'n GraphNode<'_>) -> Vec<&'n str> {
    let mut key: Vec<&str> = node.run_after_tasks.iter().map(String::as_str).collect();
    key.sort_unstable();
    key
}

fn spacer_node<'a>(id: &str, parents: &[&str], level: usize) -> GraphNode<'a> {
    GraphNode {
        id: id.to_string(),
        label: String::new(),
        node_type: NodeType::Spacer,
        run_after_tasks: parents.iter().map(ToString::to_string).collect(),
        level,
        width: 0,
        height: 0,
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod prune_transitive {
        use super::*;

        #[test]
        fn removes_edge_implied_by_chain() {
            // 0 -> 1 -> 2 and 0 -> 2
            let deps = vec![vec![1, 2], vec![2], vec![]];
            assert_eq!(prune_transitive(&deps), vec![vec![1], vec![2], vec![]]);
        }

        #[test]
        fn keeps_independent_parents() {
            let deps = vec![vec![1, 2], vec![], vec![]];
            assert_eq!(prune_transitive(&deps), deps);
        }

        #[test]
        fn removes_edges_implied_through_longer_paths() {
            // 0 -> 1 -> 2 -> 3 and 0 -> 3
            let deps = vec![vec![3, 1], vec![2], vec![3], vec![]];
            assert_eq!(prune_transitive(&deps)[0], vec![1]);
        }

        #[test]
        fn tolerates_cycles() {
            let deps = vec![vec![1, 2], vec![2], vec![1]];
            let pruned = prune_transitive(&deps);
            assert_eq!(pruned[0], vec![1, 2]);
        }
    }

    mod assign_levels {
        use super::*;

        #[test]
        fn chain_levels_count_down_to_leaf() {
            // 2 depends on 1 depends on 0
            let deps = vec![vec![], vec![0], vec![1]];
            assert_eq!(assign_levels(&deps), vec![2, 1, 0]);
        }

        #[test]
        fn uses_deepest_dependent() {
            // 1 and 2 depend on 0; 3 depends on 2
            let deps = vec![vec![], vec![0], vec![0], vec![2]];
            assert_eq!(assign_levels(&deps), vec![2, 0, 1, 0]);
        }

        #[test]
        fn terminates_on_cycles() {
            let deps = vec![vec![1], vec![0]];
            let levels = assign_levels(&deps);
            assert_eq!(levels.len(), 2);
        }
    }

    mod when_status {
        use super::*;
        use crate::tekton::WhenExpression;

        #[test]
        fn only_for_guarded_tasks() {
            let plain = PipelineTask::default();
            assert_eq!(when_status(&plain, RunStatus::Succeeded), None);
        }

        #[test]
        fn maps_met_and_unmet() {
            let guarded = PipelineTask {
                when: vec![WhenExpression::default()],
                ..PipelineTask::default()
            };
            assert_eq!(
                when_status(&guarded, RunStatus::Succeeded),
                Some(WhenStatus::Met)
            );
            assert_eq!(when_status(&guarded, RunStatus::Failed), Some(WhenStatus::Met));
            assert_eq!(
                when_status(&guarded, RunStatus::Skipped),
                Some(WhenStatus::Unmet)
            );
            assert_eq!(when_status(&guarded, RunStatus::Idle), Some(WhenStatus::Unmet));
            assert_eq!(when_status(&guarded, RunStatus::Cancelled), None);
        }

        #[test]
        fn test_outcomes_count_as_executed() {
            let guarded = PipelineTask {
                when: vec![WhenExpression::default()],
                ..PipelineTask::default()
            };
            assert_eq!(
                when_status(&guarded, RunStatus::TestFailed),
                Some(WhenStatus::Met)
            );
            assert_eq!(
                when_status(&guarded, RunStatus::TestWarning),
                Some(WhenStatus::Met)
            );
        }
    }
}
