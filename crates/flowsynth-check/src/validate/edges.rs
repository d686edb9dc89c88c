//! Raw edge validity.

use flowsynth_core::graph::Graph;

use super::problem::{GraphComponent, GraphProblem, ProblemKind};
use crate::analysis::Connectors;

/// Reports every raw edge with an endpoint that has no canonical connector.
///
/// Such edges are left out of the resolved edge lists, so everything
/// downstream behaves as if they were absent.
pub fn check_raw_edges<T>(graph: &Graph<T>, connectors: &Connectors, problems: &mut Vec<GraphProblem>) {
    for edge in &graph.control_flow {
        if connectors.control_edge(edge).is_none() {
            problems.push(GraphProblem::new(
                ProblemKind::DanglingControlEdge {
                    edge: edge.to_string(),
                },
                GraphComponent::ControlEdge(edge.clone()),
            ));
        }
    }
    for edge in &graph.data_flow {
        if connectors.data_edge(edge).is_none() {
            problems.push(GraphProblem::new(
                ProblemKind::DanglingDataEdge {
                    edge: edge.to_string(),
                },
                GraphComponent::DataEdge(edge.clone()),
            ));
        }
    }
}
