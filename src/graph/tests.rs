use super::*;
use crate::tekton::{PipelineDefinition, PipelineRunRecord, RunStatus, TaskRunRecord};

const BUILD_THEN_TEST: &str = r"
tasks:
  - name: build
    taskRef:
      name: buildah
  - name: test
    taskRef:
      name: run-tests
    params:
      - name: image
        value: $(tasks.build.results.IMAGE_URL)
";

fn pipeline_run(spec: &str, status: Option<&str>) -> PipelineRunRecord {
    let conditions = status.map_or_else(String::new, |status| {
        format!("  conditions:\n    - type: Succeeded\n      status: \"{status}\"\n      reason: Running\n")
    });
    let indented: String = spec
        .lines()
        .map(|line| format!("    {line}\n"))
        .collect();
    let yaml = format!(
        "metadata:\n  name: demo-run-1\n  labels:\n    tekton.dev/pipeline: demo\nstatus:\n{conditions}  pipelineSpec:\n{indented}"
    );
    serde_yaml::from_str(&yaml).unwrap()
}

fn task_runs(yaml: &str) -> Vec<TaskRunRecord> {
    serde_yaml::from_str(yaml).unwrap()
}

fn run_after<'a>(graph: &'a GraphModel<'_>, id: &str) -> Vec<&'a str> {
    graph
        .node(id)
        .unwrap()
        .run_after_tasks
        .iter()
        .map(String::as_str)
        .collect()
}

fn edge_ids<'g>(graph: &'g GraphModel<'_>) -> Vec<&'g str> {
    graph.edges.iter().map(|e| e.id.as_str()).collect()
}

mod scenarios {
    use super::*;

    #[test]
    fn pending_without_pipeline_run_status() {
        let run = pipeline_run(BUILD_THEN_TEST, None);
        let graph = build_graph(None, &run, &[], &LayoutConfig::default()).unwrap();

        assert_eq!(graph.id, "demo-run-1");
        assert_eq!(graph.nodes.len(), 2);
        for node in &graph.nodes {
            assert_eq!(node.status(), Some(RunStatus::Pending));
        }
        assert_eq!(run_after(&graph, "test"), vec!["build"]);
        assert_eq!(graph.node("build").unwrap().level, 1);
        assert_eq!(graph.node("test").unwrap().level, 0);
        assert_eq!(edge_ids(&graph), vec!["build~to~test"]);
    }

    #[test]
    fn running_pipeline_without_task_runs_propagates_status() {
        let run = pipeline_run(BUILD_THEN_TEST, Some("Unknown"));
        let graph = build_graph(None, &run, &[], &LayoutConfig::default()).unwrap();

        for node in &graph.nodes {
            assert_eq!(node.status(), Some(RunStatus::Running));
        }
    }

    #[test]
    fn multi_platform_build_expands_per_platform() {
        let run = pipeline_run(BUILD_THEN_TEST, Some("Unknown"));
        let runs = task_runs(
            r"
- metadata:
    name: demo-run-1-build-0
    labels:
      tekton.dev/pipelineTask: build
      build.appstudio.redhat.com/target-platform: linux-x86_64
  status:
    conditions:
      - type: Succeeded
        status: 'True'
        reason: Succeeded
- metadata:
    name: demo-run-1-build-1
    labels:
      tekton.dev/pipelineTask: build
      build.appstudio.redhat.com/target-platform: linux-arm64
  status:
    conditions:
      - type: Succeeded
        status: 'False'
        reason: Failed
",
        );

        let graph = build_graph(None, &run, &runs, &LayoutConfig::default()).unwrap();

        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["build-linux-x86-64", "build-linux-arm64", "test"]);

        let x86 = graph.node("build-linux-x86-64").unwrap();
        let arm = graph.node("build-linux-arm64").unwrap();
        assert_eq!(x86.status(), Some(RunStatus::Succeeded));
        assert_eq!(arm.status(), Some(RunStatus::Failed));

        let platform = |node: &GraphNode<'_>| {
            let matrix = node.data.as_ref().unwrap().matrix.as_ref().unwrap();
            assert_eq!(matrix.original_name, "build");
            matrix.matrix_platform.clone()
        };
        assert_eq!(platform(x86).as_deref(), Some("linux/x86_64"));
        assert_eq!(platform(arm).as_deref(), Some("linux/arm64"));

        assert!(x86.run_after_tasks.is_empty());
        assert!(arm.run_after_tasks.is_empty());
        assert_eq!(
            run_after(&graph, "test"),
            vec!["build-linux-x86-64", "build-linux-arm64"]
        );
        assert_eq!(
            edge_ids(&graph),
            vec!["build-linux-x86-64~to~test", "build-linux-arm64~to~test"]
        );
        assert_eq!(
            x86.data.as_ref().unwrap().task_run.unwrap().metadata.name.as_deref(),
            Some("demo-run-1-build-0")
        );
    }

    #[test]
    fn transitive_edges_are_pruned() {
        let run = pipeline_run(
            r"
tasks:
  - name: c
  - name: b
    runAfter: [c]
  - name: a
    runAfter: [b, c]
",
            None,
        );
        let graph = build_graph(None, &run, &[], &LayoutConfig::default()).unwrap();

        assert_eq!(run_after(&graph, "a"), vec!["b"]);
        assert_eq!(run_after(&graph, "b"), vec!["c"]);
        assert_eq!(edge_ids(&graph), vec!["c~to~b", "b~to~a"]);
        assert_eq!(graph.layout.max_level, 2);
    }

    #[test]
    fn pruning_sees_through_matrix_instances() {
        let run = pipeline_run(
            r"
tasks:
  - name: build
  - name: test
    runAfter: [build]
  - name: push
    runAfter: [build, test]
",
            Some("Unknown"),
        );
        let runs = task_runs(
            r"
- metadata:
    labels:
      tekton.dev/pipelineTask: build
      build.appstudio.redhat.com/target-platform: linux-x86_64
- metadata:
    labels:
      tekton.dev/pipelineTask: build
      build.appstudio.redhat.com/target-platform: linux-arm64
",
        );

        let graph = build_graph(None, &run, &runs, &LayoutConfig::default()).unwrap();

        assert_eq!(
            run_after(&graph, "test"),
            vec!["build-linux-x86-64", "build-linux-arm64"]
        );
        assert_eq!(run_after(&graph, "push"), vec!["test"]);
        assert_eq!(graph.node("push").unwrap().level, 0);
        assert_eq!(graph.node("build-linux-arm64").unwrap().level, 2);
    }

    #[test]
    fn unchanged_snapshot_yields_identical_graph() {
        let run = pipeline_run(BUILD_THEN_TEST, Some("Unknown"));
        let runs = task_runs(
            r"
- metadata:
    labels:
      tekton.dev/pipelineTask: build
  status:
    conditions:
      - type: Succeeded
        status: 'True'
",
        );
        let layout = LayoutConfig::default();

        let first = build_graph(None, &run, &runs, &layout).unwrap();
        let second = build_graph(None, &run, &runs, &layout).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

mod structure {
    use super::*;

    #[test]
    fn missing_spec_or_name_yields_no_graph() {
        let layout = LayoutConfig::default();

        let nameless = PipelineRunRecord::default();
        assert!(build_graph(None, &nameless, &[], &layout).is_none());

        let mut specless = PipelineRunRecord::default();
        specless
            .metadata
            .labels
            .insert("tekton.dev/pipeline".to_string(), "demo".to_string());
        assert!(build_graph(None, &specless, &[], &layout).is_none());
    }

    #[test]
    fn falls_back_to_static_pipeline_spec() {
        let pipeline: PipelineDefinition = serde_yaml::from_str(&format!(
            "metadata:\n  name: demo\nspec:\n{}",
            BUILD_THEN_TEST
                .lines()
                .map(|l| format!("  {l}\n"))
                .collect::<String>()
        ))
        .unwrap();
        let run = PipelineRunRecord::default();

        let graph = build_graph(Some(&pipeline), &run, &[], &LayoutConfig::default()).unwrap();
        assert_eq!(graph.id, "demo");
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn dangling_dependencies_are_dropped() {
        let run = pipeline_run(
            r"
tasks:
  - name: a
    runAfter: [ghost]
",
            None,
        );
        let graph = build_graph(None, &run, &[], &LayoutConfig::default()).unwrap();
        assert!(run_after(&graph, "a").is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn finally_tasks_form_a_group() {
        let run = pipeline_run(
            r"
tasks:
  - name: build
  - name: test
    runAfter: [build]
  - name: lint
finally:
  - name: notify
    params:
      - name: status
        value: $(tasks.build.results.STATUS)
  - name: cleanup
",
            None,
        );
        let graph = build_graph(None, &run, &[], &LayoutConfig::default()).unwrap();

        let group = graph.finally_group.as_ref().unwrap();
        assert_eq!(group.id, FINALLY_GROUP_ID);
        assert_eq!(group.children, vec!["notify", "cleanup"]);

        let notify = graph.node("notify").unwrap();
        assert_eq!(notify.node_type, NodeType::FinallyTask);
        assert!(notify.run_after_tasks.is_empty());
        assert_eq!(notify.level, 0);
        assert_eq!(notify.width, group.width);

        let edges = edge_ids(&graph);
        assert!(edges.contains(&"test~to~finally-group"));
        assert!(edges.contains(&"lint~to~finally-group"));
        assert!(!edges.contains(&"build~to~finally-group"));
    }

    #[test]
    fn shared_parent_sets_get_a_spacer() {
        let run = pipeline_run(
            r"
tasks:
  - name: a
  - name: b
  - name: c
    runAfter: [b, a]
  - name: d
    runAfter: [a, b]
",
            None,
        );
        let graph = build_graph(None, &run, &[], &LayoutConfig::default()).unwrap();

        let spacer = graph.node("a|b").unwrap();
        assert_eq!(spacer.node_type, NodeType::Spacer);
        assert_eq!(spacer.run_after_tasks, vec!["a", "b"]);
        assert_eq!(graph.task_nodes().count(), 4);
        assert_eq!(
            edge_ids(&graph),
            vec!["a~to~a|b", "b~to~a|b", "a|b~to~c", "a|b~to~d"]
        );
    }
}

mod sizing {
    use super::*;

    #[test]
    fn siblings_share_the_widest_width() {
        let run = pipeline_run(
            r"
tasks:
  - name: clone
  - name: build-a-very-long-container-image-name
    runAfter: [clone]
  - name: lint
    runAfter: [clone]
",
            None,
        );
        let layout = LayoutConfig::default();
        let graph = build_graph(None, &run, &[], &layout).unwrap();

        let long = graph.node("build-a-very-long-container-image-name").unwrap();
        let lint = graph.node("lint").unwrap();
        assert_eq!(long.level, lint.level);
        assert_eq!(lint.width, long.width);
        assert_eq!(
            long.width,
            layout.node_width("build-a-very-long-container-image-name", 0)
        );
        assert_eq!(graph.node("clone").unwrap().width, layout.min_node_width);
        assert_eq!(graph.layout.level_widths.get(&0), Some(&long.width));
    }

    #[test]
    fn badge_widens_node_and_prefers_test_counts() {
        let run = pipeline_run(
            r"
tasks:
  - name: sast-check-with-a-long-name
",
            Some("Unknown"),
        );
        let runs = task_runs(
            r#"
- metadata:
    labels:
      tekton.dev/pipelineTask: sast-check-with-a-long-name
  status:
    conditions:
      - type: Succeeded
        status: "True"
    results:
      - name: TEST_OUTPUT
        value: '{"result":"FAILURE","failures":2,"warnings":3}'
      - name: CLAIR_SCAN_RESULT
        value: '{"vulnerabilities":{"critical":9,"high":9,"medium":9,"low":9,"unknown":9}}'
"#,
        );
        let layout = LayoutConfig::default();
        let graph = build_graph(None, &run, &runs, &layout).unwrap();

        let node = graph.node("sast-check-with-a-long-name").unwrap();
        let data = node.data.as_ref().unwrap();
        assert_eq!(data.badge_count, 5);
        assert_eq!(data.status.reason, RunStatus::TestFailed);
        assert_eq!(
            node.width,
            layout.node_width("sast-check-with-a-long-name", badge_width(5, &layout))
        );
    }

    #[test]
    fn huge_scan_counts_saturate_the_badge() {
        let run = pipeline_run(
            r"
tasks:
  - name: clair-scan
",
            Some("Unknown"),
        );
        let runs = task_runs(
            r#"
- metadata:
    labels:
      tekton.dev/pipelineTask: clair-scan
  status:
    conditions:
      - type: Succeeded
        status: "True"
    results:
      - name: CLAIR_SCAN_RESULT
        value: '{"vulnerabilities":{"critical":4294967295,"high":1}}'
"#,
        );
        let layout = LayoutConfig::default();
        let graph = build_graph(None, &run, &runs, &layout).unwrap();

        let node = graph.node("clair-scan").unwrap();
        assert_eq!(node.data.as_ref().unwrap().badge_count, u32::MAX);
        assert_eq!(
            node.width,
            layout.node_width("clair-scan", badge_width(u32::MAX, &layout))
        );
    }

    #[test]
    fn when_status_is_reported_for_guarded_tasks() {
        let run = pipeline_run(
            r"
tasks:
  - name: deploy
    when:
      - input: $(params.env)
        operator: in
        values: [prod]
  - name: build
",
            Some("Unknown"),
        );
        let mut run = run;
        run.status.as_mut().unwrap().skipped_tasks = vec![crate::tekton::SkippedTask {
            name: "deploy".to_string(),
            reason: None,
        }];
        let runs = task_runs(
            r"
- metadata:
    labels:
      tekton.dev/pipelineTask: build
",
        );

        let graph = build_graph(None, &run, &runs, &LayoutConfig::default()).unwrap();

        let deploy = graph.node("deploy").unwrap().data.as_ref().unwrap();
        assert_eq!(deploy.status.reason, RunStatus::Skipped);
        assert_eq!(deploy.when_status, Some(WhenStatus::Unmet));
        assert_eq!(graph.node("build").unwrap().data.as_ref().unwrap().when_status, None);
    }
}
