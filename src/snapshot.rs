use std::fs;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Result, RunvisError};
use crate::graph::{build_graph, GraphModel, LayoutConfig};
use crate::tekton::{PipelineDefinition, PipelineRunRecord, TaskRunRecord};

/// The (pipeline, pipeline run, task runs) triple a graph is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub pipeline: Option<PipelineDefinition>,
    pub pipeline_run: PipelineRunRecord,
    pub task_runs: Vec<TaskRunRecord>,
}

/// Task runs either as a bare list or wrapped in a Kubernetes `List`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskRunList {
    List { items: Vec<TaskRunRecord> },
    Bare(Vec<TaskRunRecord>),
}

impl Snapshot {
    /// Reads a snapshot from YAML or JSON documents on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, is empty, or does not parse.
    pub fn load(
        pipeline_run: &Path,
        task_runs: Option<&Path>,
        pipeline: Option<&Path>,
    ) -> Result<Self> {
        let pipeline_run = read_document(pipeline_run)?;
        let task_runs = match task_runs {
            Some(path) => match read_document::<TaskRunList>(path)? {
                TaskRunList::List { items } => items,
                TaskRunList::Bare(items) => items,
            },
            None => Vec::new(),
        };
        let pipeline = pipeline.map(read_document).transpose()?;

        debug!("Loaded snapshot with {} task runs", task_runs.len());

        Ok(Self {
            pipeline,
            pipeline_run,
            task_runs,
        })
    }

    pub fn graph(&self, layout: &LayoutConfig) -> Option<GraphModel<'_>> {
        build_graph(
            self.pipeline.as_ref(),
            &self.pipeline_run,
            &self.task_runs,
            layout,
        )
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Err(RunvisError::Snapshot(format!(
            "{} is empty",
            path.display()
        )));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&contents)?),
        _ => Ok(serde_yaml::from_str(&contents)?),
    }
}
