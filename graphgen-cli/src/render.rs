//! Text and JSON renderings of a finished graph.
//!
//! Both renderers only read through [`GraphView`], so they can be handed any
//! graph without granting mutation rights.

use std::collections::BTreeSet;

use graphgen_core::{DEFAULT_DEPTH, EdgeColor, EdgeId, GraphDepth, GraphError, GraphView, VertexId};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while rendering a graph.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The graph returned an inconsistent lookup.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// JSON serialisation failed.
    #[error("failed to serialise graph: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders the human-readable summary written to the generation journal.
///
/// # Examples
/// ```
/// use graphgen_cli::render::render_summary;
/// use graphgen_core::Graph;
///
/// let mut graph = Graph::new();
/// let root = graph.add_vertex();
/// let child = graph.add_vertex();
/// graph.add_edge(root, child).expect("tree edge");
/// assert_eq!(
///     render_summary(&graph),
///     "{\n\tdepth: 2,\n\tvertices: {amount: 2, distribution: [ 1, 1]},\n\
///      \tedges: {amount: 1, distribution: { grey: 1, green: 0, yellow: 0, red: 0}}\n}",
/// );
/// ```
#[must_use]
pub fn render_summary<G: GraphView>(graph: &G) -> String {
    let vertices = (DEFAULT_DEPTH..DEFAULT_DEPTH + graph.depth())
        .map(|depth| {
            let size = graph.depth_vertex_ids(depth).map_or(0, BTreeSet::len);
            format!(" {size}")
        })
        .collect::<Vec<_>>()
        .join(",");

    let distribution = graph.color_distribution();
    let edges = EdgeColor::ALL
        .iter()
        .map(|color| format!(" {color}: {}", distribution.count(*color)))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{{\n\tdepth: {depth},\n\tvertices: {{amount: {vertex_count}, distribution: [{vertices}]}},\n\
         \tedges: {{amount: {edge_count}, distribution: {{{edges}}}}}\n}}",
        depth = graph.depth(),
        vertex_count = graph.vertices_count(),
        edge_count = graph.edges_count(),
    )
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    depth: GraphDepth,
    vertices: Vec<VertexDocument<'a>>,
    edges: Vec<EdgeDocument>,
}

#[derive(Serialize)]
struct VertexDocument<'a> {
    id: VertexId,
    edge_ids: &'a BTreeSet<EdgeId>,
    depth: GraphDepth,
}

#[derive(Serialize)]
struct EdgeDocument {
    id: EdgeId,
    vertex_ids: [VertexId; 2],
    color: &'static str,
}

/// Renders `graph` as pretty-printed JSON with `depth`, `vertices`, and
/// `edges` keys.
///
/// # Errors
/// Returns [`RenderError`] if a vertex lookup fails or serialisation fails.
pub fn render_json<G: GraphView>(graph: &G) -> Result<String, RenderError> {
    let vertices = graph
        .vertices()
        .map(|vertex| {
            Ok(VertexDocument {
                id: vertex.id(),
                edge_ids: graph.connected_edge_ids(vertex.id())?,
                depth: graph.vertex_depth(vertex.id())?,
            })
        })
        .collect::<Result<Vec<_>, GraphError>>()?;
    let edges = graph
        .edges()
        .map(|edge| EdgeDocument {
            id: edge.id(),
            vertex_ids: [edge.from_vertex_id(), edge.to_vertex_id()],
            color: edge.color().as_str(),
        })
        .collect();

    let document = GraphDocument {
        depth: graph.depth(),
        vertices,
        edges,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use graphgen_core::Graph;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    #[fixture]
    fn colored() -> Graph {
        let mut graph = Graph::new();
        let root = graph.add_vertex();
        let child = graph.add_vertex();
        graph.add_edge(root, child).expect("grey");
        let grandchild = graph.add_vertex();
        graph.add_edge(child, grandchild).expect("grey");
        graph.add_edge(root, grandchild).expect("red");
        graph.add_edge(child, child).expect("green");
        graph
    }

    #[rstest]
    fn summary_lists_every_depth_bucket(colored: Graph) {
        assert_eq!(
            render_summary(&colored),
            "{\n\tdepth: 3,\n\tvertices: {amount: 3, distribution: [ 1, 1, 1]},\n\
             \tedges: {amount: 4, distribution: { grey: 2, green: 1, yellow: 0, red: 1}}\n}"
        );
    }

    #[rstest]
    fn summary_of_empty_graph_has_no_buckets() {
        assert_eq!(
            render_summary(&Graph::new()),
            "{\n\tdepth: 0,\n\tvertices: {amount: 0, distribution: []},\n\
             \tedges: {amount: 0, distribution: { grey: 0, green: 0, yellow: 0, red: 0}}\n}"
        );
    }

    #[rstest]
    fn json_carries_vertices_and_edges(colored: Graph) {
        let rendered = render_json(&colored).expect("rendering must succeed");
        let value: Value = serde_json::from_str(&rendered).expect("output must be JSON");
        assert_eq!(
            value,
            json!({
                "depth": 3,
                "vertices": [
                    {"id": 0, "edge_ids": [0, 2], "depth": 1},
                    {"id": 1, "edge_ids": [0, 1, 3], "depth": 2},
                    {"id": 2, "edge_ids": [1, 2], "depth": 3},
                ],
                "edges": [
                    {"id": 0, "vertex_ids": [0, 1], "color": "grey"},
                    {"id": 1, "vertex_ids": [1, 2], "color": "grey"},
                    {"id": 2, "vertex_ids": [0, 2], "color": "red"},
                    {"id": 3, "vertex_ids": [1, 1], "color": "green"},
                ],
            })
        );
    }

    #[rstest]
    fn json_of_empty_graph_has_empty_arrays() {
        let rendered = render_json(&Graph::new()).expect("rendering must succeed");
        let value: Value = serde_json::from_str(&rendered).expect("output must be JSON");
        assert_eq!(value, json!({"depth": 0, "vertices": [], "edges": []}));
    }
}
