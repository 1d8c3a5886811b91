//! Spans and events emitted by generation and scheduling.

use graphgen_core::{
    EdgeColor, GenerationController, GeneratorParams, GraphGenerator, GraphView,
};
use graphgen_test_support::capture::CaptureLayer;
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

#[rstest]
fn generate_records_its_configuration_and_result() {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let generator = GraphGenerator::new(GeneratorParams::new(3, 2).with_rng_seed(4));

    let graph = tracing::subscriber::with_default(subscriber, || generator.generate())
        .expect("generation must succeed");

    let span = layer
        .span("generator.generate")
        .expect("generator.generate span must close");
    assert_eq!(span.field("depth"), Some("3"));
    assert_eq!(span.field("new_vertices_count"), Some("2"));
    assert!(layer.span("generator.grey_phase").is_some());
    assert!(layer.span("generator.colored_phase").is_some());

    let completed = layer.events_with_message("graph generation completed");
    assert_eq!(completed.len(), 1);
    let event = &completed[0];
    assert_eq!(event.level, Level::INFO);
    assert_eq!(event.span.as_deref(), Some("generator.generate"));
    let vertices = graph.vertices_count().to_string();
    let edges = graph.edges_count().to_string();
    assert_eq!(event.field("vertices"), Some(vertices.as_str()));
    assert_eq!(event.field("edges"), Some(edges.as_str()));
}

#[rstest]
fn colored_passes_report_inside_the_colored_phase() {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let generator = GraphGenerator::new(GeneratorParams::new(4, 2).with_rng_seed(4));

    let graph = tracing::subscriber::with_default(subscriber, || generator.generate())
        .expect("generation must succeed");

    let passes = layer.events_with_message("colored pass completed");
    assert_eq!(passes.len(), 3);
    assert!(passes.iter().all(|event| event.level == Level::DEBUG));
    assert!(
        passes
            .iter()
            .all(|event| event.span.as_deref() == Some("generator.colored_phase"))
    );

    let mut names: Vec<_> = passes.iter().filter_map(|event| event.field("pass")).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["green", "red", "yellow"]);

    let added: usize = passes
        .iter()
        .filter_map(|event| event.field("added"))
        .map(|added| added.parse::<usize>().expect("added is a count"))
        .sum();
    let distribution = graph.color_distribution();
    assert_eq!(added, distribution.total() - distribution.count(EdgeColor::Grey));
}

#[rstest]
fn grey_branches_report_inside_the_grey_phase() {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let generator = GraphGenerator::new(GeneratorParams::new(4, 3).with_rng_seed(9));

    let graph = tracing::subscriber::with_default(subscriber, || generator.generate())
        .expect("generation must succeed");

    let branches = layer.events_with_message("grey edge added");
    assert_eq!(branches.len(), graph.color_distribution().count(EdgeColor::Grey));
    assert!(
        branches
            .iter()
            .all(|event| event.span.as_deref() == Some("generator.grey_phase"))
    );
}

#[rstest]
fn zero_depth_skips_both_phases() {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let generator = GraphGenerator::new(GeneratorParams::new(0, 2));

    tracing::subscriber::with_default(subscriber, || generator.generate())
        .expect("generation must succeed");

    assert!(layer.span("generator.generate").is_some());
    assert!(layer.span("generator.grey_phase").is_none());
    assert!(layer.span("generator.colored_phase").is_none());
}

#[rstest]
fn worker_events_are_attributed_to_the_controller() {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let controller = GenerationController::new(2, 3, GeneratorParams::new(2, 1));

    tracing::subscriber::with_default(subscriber, || controller.generate(|_| {}, |_, _| {}))
        .expect("generation must succeed");

    let span = layer
        .span("controller.generate")
        .expect("controller.generate span must close");
    assert_eq!(span.field("graphs_count"), Some("3"));
    assert_eq!(span.field("threads_count"), Some(controller.threads_count().to_string().as_str()));

    let mut finished: Vec<_> = layer
        .events_with_message("generation finished")
        .into_iter()
        .filter_map(|event| event.field("index").map(str::to_owned))
        .collect();
    finished.sort();
    assert_eq!(finished, vec!["0", "1", "2"]);
    assert_eq!(layer.events_with_message("generation started").len(), 3);
    assert_eq!(layer.spans().iter().filter(|span| span.name == "generator.generate").count(), 3);
}
