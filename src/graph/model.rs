use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::tekton::{PipelineTask, RunStatus, ScanResults, TaskRunRecord};

/// Display status of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepRunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    TestFailed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub name: String,
    pub status: StepRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Computed status of a projected task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub reason: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_fail_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_warn_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_results: Option<ScanResults>,
}

impl TaskStatus {
    pub fn new(reason: RunStatus) -> Self {
        Self {
            reason,
            duration: None,
            test_fail_count: None,
            test_warn_count: None,
            scan_results: None,
        }
    }
}

/// Identity of one instance of a fanned-out task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixIdentity {
    pub original_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix_platform: Option<String>,
}

/// A static pipeline task enriched with runtime status.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedTask<'a> {
    /// Unique name after matrix expansion.
    pub name: String,
    pub task: &'a PipelineTask,
    pub status: TaskStatus,
    pub steps: Vec<StepStatus>,
    pub matrix: Option<MatrixIdentity>,
    pub task_run: Option<&'a TaskRunRecord>,
}

impl ProjectedTask<'_> {
    /// Name of the static task this entry was projected from.
    pub fn original_name(&self) -> &str {
        self.matrix
            .as_ref()
            .map_or(self.task.name.as_str(), |m| m.original_name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WhenStatus {
    Met,
    Unmet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Task,
    FinallyTask,
    Spacer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData<'a> {
    pub status: TaskStatus,
    pub steps: Vec<StepStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_status: Option<WhenStatus>,
    pub badge_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<String>,
    #[serde(flatten)]
    pub matrix: Option<MatrixIdentity>,
    #[serde(
        rename = "taskRun",
        serialize_with = "serialize_task_run_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_run: Option<&'a TaskRunRecord>,
}

fn serialize_task_run_name<S: Serializer>(
    task_run: &Option<&TaskRunRecord>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let name = task_run.and_then(|tr| tr.metadata.name.as_deref());
    serializer.serialize_some(&name)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode<'a> {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub run_after_tasks: Vec<String>,
    pub level: usize,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeData<'a>>,
}

impl GraphNode<'_> {
    pub fn status(&self) -> Option<RunStatus> {
        self.data.as_ref().map(|d| d.status.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: format!("{source}~to~{target}"),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Container grouping the finally tasks of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinallyGroup {
    pub id: String,
    pub children: Vec<String>,
    pub width: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    pub max_level: usize,
    pub node_height: u32,
    pub level_widths: BTreeMap<usize, u32>,
}

/// Layout-ready execution graph of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphModel<'a> {
    pub id: String,
    pub nodes: Vec<GraphNode<'a>>,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finally_group: Option<FinallyGroup>,
    pub layout: LayoutMetadata,
}

impl<'a> GraphModel<'a> {
    pub fn node(&self, id: &str) -> Option<&GraphNode<'a>> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes backed by a pipeline task, excluding spacers.
    pub fn task_nodes(&self) -> impl Iterator<Item = &GraphNode<'a>> {
        self.nodes.iter().filter(|n| n.node_type != NodeType::Spacer)
    }
}
