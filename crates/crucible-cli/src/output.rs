//! Output formatting utilities

use std::fmt::Write;
use std::time::Duration;

use crucible_core::{DerivationGraph, NodeId, SearchMode, WireNode};
use crucible_search::SearchOutcome;
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tree,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Tree,
        }
    }
}

/// Single-mode response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleResponse {
    pub tree: Vec<WireNode>,
    pub nodes_visited: Vec<usize>,
    pub execution_time: f64,
}

/// Multiple-mode response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleResponse {
    pub trees: Vec<WireNode>,
    pub nodes_visited: Vec<usize>,
    pub execution_time: f64,
}

/// Search response in the wire format shared by the CLI and the HTTP server
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Single(SingleResponse),
    Multiple(MultipleResponse),
}

impl SearchResponse {
    pub fn from_outcome(outcome: &SearchOutcome, elapsed: Duration) -> Self {
        let execution_time = elapsed.as_millis() as f64;
        let nodes_visited = outcome.nodes_visited();
        match outcome.mode {
            SearchMode::Single => Self::Single(SingleResponse {
                tree: outcome.wire_trees(),
                nodes_visited,
                execution_time,
            }),
            SearchMode::Multiple => Self::Multiple(MultipleResponse {
                trees: outcome.wire_trees(),
                nodes_visited,
                execution_time,
            }),
        }
    }
}

/// Format a search outcome
pub fn format_outcome(
    outcome: &SearchOutcome,
    elapsed: Duration,
    format: OutputFormat,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        let response = SearchResponse::from_outcome(outcome, elapsed);
        return Ok(serde_json::to_string_pretty(&response)?);
    }

    let mut out = String::new();
    if outcome.is_empty() {
        writeln!(
            out,
            "No path found for {} using {}",
            outcome.target, outcome.algorithm
        )?;
        return Ok(out);
    }

    writeln!(
        out,
        "{} via {} ({} mode): {} path(s) in {} ms, graph of {} nodes{}",
        outcome.target,
        outcome.algorithm,
        outcome.mode,
        outcome.paths.len(),
        elapsed.as_millis(),
        outcome.graph_nodes,
        if outcome.truncated { " (truncated)" } else { "" }
    )?;
    if outcome.timed_out {
        writeln!(out, "Search timed out; results may be incomplete")?;
    }

    for (i, path) in outcome.paths.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "#{} - {} recipes, depth {}, {} nodes visited",
            i + 1,
            path.tree.recipe_count(),
            path.tree.depth(),
            path.nodes_visited
        )?;
        out.push_str(&path.tree.render());
    }
    Ok(out)
}

/// Serializable view of a derivation graph node and its alternatives
#[derive(Debug, Serialize)]
pub struct GraphView {
    pub item: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cycle: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipes: Vec<[GraphView; 2]>,
}

impl GraphView {
    pub fn new(graph: &DerivationGraph, id: NodeId) -> Self {
        let node = graph.node(id);
        Self {
            item: node.item.clone(),
            cycle: node.is_cycle,
            recipes: node
                .combinations
                .iter()
                .map(|c| [Self::new(graph, c.first), Self::new(graph, c.second)])
                .collect(),
        }
    }
}

/// Format a derivation graph
pub fn format_graph(graph: &DerivationGraph, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&GraphView::new(
            graph,
            graph.root(),
        ))?),
        OutputFormat::Tree => {
            let mut out = graph.render();
            writeln!(
                out,
                "\n{} nodes, {} cycles{}",
                graph.len(),
                graph.cycle_count(),
                if graph.is_truncated() { ", truncated" } else { "" }
            )?;
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_core::{Algorithm, PathResult, RecipeNode};

    fn outcome(mode: SearchMode) -> SearchOutcome {
        let tree = RecipeNode::with_recipe(
            "Mud",
            RecipeNode::leaf("Water"),
            RecipeNode::leaf("Earth"),
        );
        SearchOutcome {
            target: "Mud".to_string(),
            algorithm: Algorithm::Bfs,
            mode,
            paths: vec![PathResult::new(tree, 3)],
            graph_nodes: 3,
            truncated: false,
            timed_out: false,
        }
    }

    #[test]
    fn test_single_response_shape() {
        let response =
            SearchResponse::from_outcome(&outcome(SearchMode::Single), Duration::from_millis(12));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["tree"][0]["name"], "Mud");
        assert_eq!(json["tree"][0]["children"][0]["name"], "Water");
        assert_eq!(json["nodesVisited"], serde_json::json!([3]));
        assert_eq!(json["executionTime"], 12.0);
        assert!(json.get("trees").is_none());
    }

    #[test]
    fn test_multiple_response_shape() {
        let response =
            SearchResponse::from_outcome(&outcome(SearchMode::Multiple), Duration::ZERO);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["trees"][0]["name"], "Mud");
        assert!(json.get("tree").is_none());
    }

    #[test]
    fn test_tree_format() {
        let text = format_outcome(
            &outcome(SearchMode::Single),
            Duration::ZERO,
            OutputFormat::Tree,
        )
        .unwrap();
        assert!(text.contains("Mud via BFS (single mode): 1 path(s)"));
        assert!(text.contains("├── Water"));
        assert!(text.contains("└── Earth"));
    }
}
