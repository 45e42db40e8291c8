//! Builds layout-ready execution graphs from Tekton pipeline runs.
//!
//! The engine takes a pipeline run, its task runs and optionally the pipeline
//! definition, and projects them into a [`GraphModel`]: task nodes with
//! runtime status, dependency edges, levels, widths and the finally group.

pub mod config;
pub mod error;
pub mod graph;
pub mod snapshot;
pub mod tekton;

pub use graph::{build_graph, GraphModel, LayoutConfig};
pub use snapshot::Snapshot;
