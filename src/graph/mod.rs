mod assemble;
mod badge;
mod dependencies;
mod layout;
mod matrix;
mod model;
mod projection;
mod steps;

#[cfg(test)]
mod tests;

pub use assemble::{build_graph, FINALLY_GROUP_ID};
pub use badge::{badge_count, badge_width};
pub use dependencies::{extract_task_references, task_dependencies};
pub use layout::LayoutConfig;
pub use matrix::{display_platform, expand_matrix, is_matrix_fan_out, sanitize_platform};
pub use model::{
    Edge, FinallyGroup, GraphModel, GraphNode, LayoutMetadata, MatrixIdentity, NodeData,
    NodeType, ProjectedTask, StepRunStatus, StepStatus, TaskStatus, WhenStatus,
};
pub use projection::{format_duration, ProjectionContext};
pub use steps::derive_step_statuses;
