use std::collections::BTreeMap;
use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};
use runvis::graph::{GraphModel, GraphNode, NodeType};
use runvis::tekton::RunStatus;

use super::styling::{bright, bright_yellow, cyan, dim, status_styled};
use super::tables::{badge_cell, color_coded_status_cell, create_table, steps_progress_cell};

/// Prints a human-readable summary of a pipeline run graph to stdout.
///
/// Displays:
/// - Overview: run name, task/finally/edge counts, depth, status tally
/// - Tasks: one row per task node, ordered from the first level to the last
/// - Finally: the finally group, when the pipeline declares one
pub fn print_summary(graph: &GraphModel<'_>) {
    println!("{}", render_summary(graph));
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn count_nodes(graph: &GraphModel<'_>, node_type: NodeType) -> usize {
    graph
        .nodes
        .iter()
        .filter(|n| n.node_type == node_type)
        .count()
}

fn format_run_after(node: &GraphNode<'_>) -> String {
    if node.run_after_tasks.is_empty() {
        "-".to_string()
    } else {
        node.run_after_tasks.join("\n")
    }
}

fn add_node_row(table: &mut comfy_table::Table, node: &GraphNode<'_>) {
    let Some(data) = &node.data else {
        return;
    };

    table.add_row(vec![
        Cell::new(&node.label),
        Cell::new(node.level),
        color_coded_status_cell(data.status.reason),
        steps_progress_cell(&data.steps),
        badge_cell(data.badge_count),
        Cell::new(data.status.duration.as_deref().unwrap_or("-")),
        Cell::new(format_run_after(node)),
        Cell::new(
            data.matrix
                .as_ref()
                .and_then(|m| m.matrix_platform.as_deref())
                .unwrap_or("-"),
        ),
    ]);
}

fn render_summary(graph: &GraphModel<'_>) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");

    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for status in graph.task_nodes().filter_map(GraphNode::status) {
        *tally.entry(status.label()).or_insert(0) += 1;
    }
    let tally_line = tally
        .iter()
        .map(|(label, count)| format!("{label}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        dim("Pipeline run:"),
        cyan(&graph.id),
        dim("Tasks:"),
        bright_yellow(count_nodes(graph, NodeType::Task)),
        dim("Finally tasks:"),
        bright_yellow(count_nodes(graph, NodeType::FinallyTask)),
        dim("Edges:"),
        bright_yellow(graph.edges.len()),
        dim("Levels:"),
        bright_yellow(graph.layout.max_level + 1),
        dim("Statuses:"),
        dim(if tally_line.is_empty() { "-".to_string() } else { tally_line }),
    );

    if graph.nodes.is_empty() {
        let _ = writeln!(output, "{}", bright_yellow("Pipeline declares no tasks."));
        return output;
    }

    add_section_header(&mut output, "🧱", "Tasks");

    let mut tasks_table = create_table();
    tasks_table.set_header(create_cyan_header(&[
        "Task", "Level", "Status", "Steps", "Badge", "Duration", "Run After", "Platform",
    ]));

    let mut regular: Vec<&GraphNode<'_>> = graph
        .nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Task)
        .collect();
    regular.sort_by(|a, b| b.level.cmp(&a.level));
    for node in regular {
        add_node_row(&mut tasks_table, node);
    }
    let _ = writeln!(output, "{tasks_table}\n");

    if let Some(group) = &graph.finally_group {
        add_section_header(&mut output, "🏁", "Finally");

        let mut finally_table = create_table();
        finally_table.set_header(create_cyan_header(&[
            "Task", "Level", "Status", "Steps", "Badge", "Duration", "Run After", "Platform",
        ]));
        for node in group.children.iter().filter_map(|id| graph.node(id)) {
            add_node_row(&mut finally_table, node);
        }
        let _ = writeln!(output, "{finally_table}\n");
    }

    let failing: Vec<String> = graph
        .task_nodes()
        .filter_map(|n| n.status().map(|status| (n, status)))
        .filter(|(_, status)| {
            matches!(
                status,
                RunStatus::Failed | RunStatus::FailedToStart | RunStatus::TestFailed
            )
        })
        .map(|(n, status)| format!("{} ({})", n.id, status_styled(status)))
        .collect();
    if !failing.is_empty() {
        add_section_header(&mut output, "🚨", "Needs Attention");
        for line in failing {
            let _ = writeln!(output, "  • {line}");
        }
    }

    output
}
