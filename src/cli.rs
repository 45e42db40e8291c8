use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use runvis::config::{Config, OutputFormat};
use runvis::Snapshot;

use crate::output::{export_graph, print_summary};

#[derive(Parser)]
#[command(name = "runvis")]
#[command(author, version, about = "Pipeline Run Graph Tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    #[arg(short, long, global = true, env = "RUNVIS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the execution graph of a pipeline run
    Graph {
        /// PipelineRun document (YAML or JSON)
        #[arg(short = 'r', long)]
        pipeline_run: PathBuf,

        /// TaskRuns as a list or a `kind: List` document
        #[arg(short, long)]
        task_runs: Option<PathBuf>,

        /// Pipeline definition, used when the run carries no resolved spec
        #[arg(short = 'P', long)]
        pipeline: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

impl Cli {
    fn execute_graph(
        &self,
        config: &Config,
        pipeline_run: &Path,
        task_runs: Option<&Path>,
        pipeline: Option<&Path>,
        format: OutputFormat,
    ) -> Result<()> {
        info!("Building graph for pipeline run: {}", pipeline_run.display());

        let snapshot = Snapshot::load(pipeline_run, task_runs, pipeline)?;

        let Some(graph) = snapshot.graph(&config.layout) else {
            warn!("Pipeline run has no resolvable pipeline name or spec, nothing to draw");
            return Ok(());
        };

        info!(
            "Graph {} has {} nodes and {} edges",
            graph.id,
            graph.nodes.len(),
            graph.edges.len()
        );

        if format == OutputFormat::Summary && self.output.is_none() {
            print_summary(&graph);
            return Ok(());
        }

        // Summary cannot be written to a file, fall back to JSON
        let format = match format {
            OutputFormat::Summary => OutputFormat::Json,
            other => other,
        };
        let pretty = self.pretty || config.output.pretty;

        if let Some(output_path) = &self.output {
            let mut writer = BufWriter::new(File::create(output_path)?);
            export_graph(&graph, format, pretty, &mut writer)?;
            writer.flush()?;
            info!("Graph written to: {}", output_path.display());
        } else {
            let stdout = io::stdout();
            export_graph(&graph, format, pretty, &mut stdout.lock())?;
        }

        Ok(())
    }

    pub fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Graph {
                pipeline_run,
                task_runs,
                pipeline,
                format,
            } => self.execute_graph(
                &config,
                pipeline_run,
                task_runs.as_deref(),
                pipeline.as_deref(),
                format.unwrap_or(config.output.format),
            ),
        }
    }
}
