use anyhow::Result;
use std::io::Write;

use runvis::config::OutputFormat;
use runvis::graph::GraphModel;

/// Exports a pipeline run graph to machine-readable formats.
///
/// - JSON: the full layout-ready graph model
/// - CSV: one row per task node, for spreadsheets
pub fn export_graph(
    graph: &GraphModel<'_>,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            // Summary format is handled separately in cli.rs
            unreachable!("Summary format should be handled in CLI")
        }
        OutputFormat::Json => export_json(graph, pretty, output),
        OutputFormat::Csv => export_csv(graph, output),
    }
}

fn export_json(graph: &GraphModel<'_>, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(graph)?
    } else {
        serde_json::to_string(graph)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

fn escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn export_csv(graph: &GraphModel<'_>, output: &mut dyn Write) -> Result<()> {
    writeln!(
        output,
        "Node,Type,Level,Width,Status,Duration,Steps,Badge,Platform,Run After"
    )?;

    for node in graph.task_nodes() {
        let Some(data) = &node.data else {
            continue;
        };
        let node_type = serde_json::to_value(node.node_type)?;

        writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{}",
            escape(&node.id),
            node_type.as_str().unwrap_or_default(),
            node.level,
            node.width,
            data.status.reason.label(),
            escape(data.status.duration.as_deref().unwrap_or_default()),
            data.steps.len(),
            data.badge_count,
            escape(
                data.matrix
                    .as_ref()
                    .and_then(|m| m.matrix_platform.as_deref())
                    .unwrap_or_default()
            ),
            escape(&node.run_after_tasks.join(" ")),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use runvis::graph::LayoutConfig;
    use runvis::tekton::PipelineRunRecord;

    fn sample_run() -> PipelineRunRecord {
        serde_yaml::from_str(
            r"
metadata:
  name: demo-run-1
  labels:
    tekton.dev/pipeline: demo
status:
  pipelineSpec:
    tasks:
      - name: build
      - name: test
        runAfter: [build]
",
        )
        .unwrap()
    }

    #[test]
    fn test_export_json_contains_nodes_and_edges() {
        let run = sample_run();
        let graph = runvis::build_graph(None, &run, &[], &LayoutConfig::default()).unwrap();

        let mut buffer = Vec::new();
        export_graph(&graph, OutputFormat::Json, false, &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["id"], "demo-run-1");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["edges"][0]["id"], "build~to~test");
    }

    #[test]
    fn test_export_csv_has_row_per_task() {
        let run = sample_run();
        let graph = runvis::build_graph(None, &run, &[], &LayoutConfig::default()).unwrap();

        let mut buffer = Vec::new();
        export_graph(&graph, OutputFormat::Csv, false, &mut buffer).unwrap();

        let csv = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Node,Type,Level"));
        assert!(lines.iter().any(|l| l.starts_with("\"test\",") && l.ends_with("\"build\"")));
    }
}
