//! Graph analysis: pure derivations from a graph and a proc catalog.
//!
//! - [`connectors`]: the canonical control/symbol connector sets and
//!   normalization of raw connectors against them.
//! - [`symbols`]: symbol instances (type + display names) per symbol source.
//! - [`flow_graph`]: the control network as a petgraph digraph.
//! - [`market`]: which symbols are available at which control point.
//! - [`traversal`]: adjacency queries used to enumerate synthesis options.
//!
//! Nothing here fails or mutates; malformed graphs simply yield fewer
//! canonical connectors, and validation reports what was dropped.

use indexmap::IndexMap;

use flowsynth_core::connector::SymbolSourceKey;
use flowsynth_core::edge::{ControlFlow, DataFlow};
use flowsynth_core::graph::{Graph, NodeTable};
use flowsynth_core::proc_def::ProcCatalog;

pub mod connectors;
pub mod flow_graph;
pub mod market;
pub mod symbols;
pub mod traversal;

pub use connectors::Connectors;
pub use flow_graph::{ControlGraph, ControlPoint};
pub use market::Market;
pub use symbols::{
    build_symbols, symbol_sink_known_names, symbol_sink_type, symbol_source_type, SymbolInstance,
    SymbolNames,
};

/// Everything derived from one graph + catalog, computed in dependency order.
#[derive(Debug, Clone)]
pub struct Analysis<T> {
    pub nodes: NodeTable,
    pub connectors: Connectors,
    /// Raw control edges that normalized, with canonical endpoints.
    pub control_flow: Vec<ControlFlow>,
    /// Raw data edges that normalized, with canonical endpoints.
    pub data_flow: Vec<DataFlow>,
    pub symbols: IndexMap<SymbolSourceKey, SymbolInstance<T>>,
    pub control: ControlGraph,
    pub market: Market,
}

impl<T: Clone> Analysis<T> {
    pub fn run(graph: &Graph<T>, catalog: &ProcCatalog<T>) -> Self {
        let nodes = graph.nodes();
        let connectors = Connectors::enumerate(graph, catalog, &nodes.nodes);
        let control_flow = connectors.resolve_control_flow(&graph.control_flow);
        let data_flow = connectors.resolve_data_flow(&graph.data_flow);
        let symbols = build_symbols(graph, catalog, &connectors, &data_flow);
        let control = ControlGraph::build(&connectors, &control_flow);
        let market = Market::compute(&control, &symbols);
        Analysis {
            nodes,
            connectors,
            control_flow,
            data_flow,
            symbols,
            control,
            market,
        }
    }
}
