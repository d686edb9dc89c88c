//! Graph validation.
//!
//! Runs every check over an already-computed [`Analysis`] and collects ALL
//! problems at once:
//! - [`nodes`]: catalog references and node shapes.
//! - [`edges`]: raw edges whose endpoints do not normalize.
//! - [`control`]: duplicate/unconnected control connectors, reachability.
//! - [`data`]: type correctness, symbol sink connections and availability.
//!
//! Checks only read the graph and never fail.

pub mod control;
pub mod data;
pub mod edges;
pub mod nodes;
pub mod problem;

pub use problem::{GraphComponent, GraphProblem, ProblemKind, Severity};

use flowsynth_core::graph::Graph;
use flowsynth_core::proc_def::ProcCatalog;
use flowsynth_core::types::TypeSystem;

use crate::analysis::Analysis;

/// Collects the problems of `graph`, in check order.
pub fn validate_graph<S: TypeSystem>(
    graph: &Graph<S::Type>,
    catalog: &ProcCatalog<S::Type>,
    types: &S,
    analysis: &Analysis<S::Type>,
) -> Vec<GraphProblem> {
    let mut problems = Vec::new();
    nodes::check_nodes(graph, catalog, &analysis.nodes, &mut problems);
    edges::check_raw_edges(graph, &analysis.connectors, &mut problems);
    control::check_control_flow(analysis, &mut problems);
    data::check_data_flow(graph, catalog, types, analysis, &mut problems);
    data::check_availability(analysis, &mut problems);
    problems
}
