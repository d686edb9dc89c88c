//! Connector enumeration and normalization.
//!
//! Enumerates every connector that *could* take part in an edge given the
//! graph's nodes, declarations and the catalog, not just those some edge
//! already uses. The enumerated connector for a key is the canonical one:
//! normalizing a raw connector means looking up its key, and a raw connector
//! with no canonical counterpart is dangling.
//!
//! Enumeration order is deterministic (boundary first, then nodes in
//! first-mention order, then catalog declaration order). Problems,
//! unconnected connectors and synthesis successors are listed in that order.

use indexmap::IndexMap;

use flowsynth_core::connector::{
    ControlSink, ControlSinkKey, ControlSource, ControlSourceKey, SymbolSink, SymbolSinkKey,
    SymbolSource, SymbolSourceKey,
};
use flowsynth_core::edge::{ControlFlow, DataFlow};
use flowsynth_core::graph::Graph;
use flowsynth_core::id::NodeId;
use flowsynth_core::node::Node;
use flowsynth_core::proc_def::ProcCatalog;

/// The canonical connector sets of one graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connectors {
    pub control_sources: IndexMap<ControlSourceKey, ControlSource>,
    pub control_sinks: IndexMap<ControlSinkKey, ControlSink>,
    pub symbol_sources: IndexMap<SymbolSourceKey, SymbolSource>,
    pub symbol_sinks: IndexMap<SymbolSinkKey, SymbolSink>,
}

impl Connectors {
    /// Enumerates all connectors of `graph` whose nodes are `nodes`.
    pub fn enumerate<T>(
        graph: &Graph<T>,
        catalog: &ProcCatalog<T>,
        nodes: &IndexMap<NodeId, Node>,
    ) -> Self {
        let control_sources = control_sources(catalog, nodes);
        let control_sinks = control_sinks(graph, catalog, nodes);
        let symbol_sources = symbol_sources(graph, catalog, control_sources.values());
        let symbol_sinks = symbol_sinks(graph, catalog, control_sinks.values());
        Connectors {
            control_sources,
            control_sinks,
            symbol_sources,
            symbol_sinks,
        }
    }

    // -----------------------------------------------------------------------
    // Normalization
    // -----------------------------------------------------------------------

    pub fn control_source(&self, x: &ControlSource) -> Option<&ControlSource> {
        self.control_sources.get(&x.key())
    }

    pub fn control_sink(&self, x: &ControlSink) -> Option<&ControlSink> {
        self.control_sinks.get(&x.key())
    }

    pub fn symbol_source(&self, x: &SymbolSource) -> Option<&SymbolSource> {
        self.symbol_sources.get(&x.key())
    }

    pub fn symbol_sink(&self, x: &SymbolSink) -> Option<&SymbolSink> {
        self.symbol_sinks.get(&x.key())
    }

    /// Normalizes both endpoints of a control edge.
    pub fn control_edge(&self, edge: &ControlFlow) -> Option<ControlFlow> {
        Some(ControlFlow::new(
            self.control_source(&edge.source)?.clone(),
            self.control_sink(&edge.target)?.clone(),
        ))
    }

    /// Normalizes both endpoints of a data edge.
    pub fn data_edge(&self, edge: &DataFlow) -> Option<DataFlow> {
        Some(DataFlow::new(
            self.symbol_source(&edge.source)?.clone(),
            self.symbol_sink(&edge.target)?.clone(),
        ))
    }

    /// Raw control edges with both endpoints normalized; dangling ones are dropped.
    pub fn resolve_control_flow(&self, raw: &[ControlFlow]) -> Vec<ControlFlow> {
        raw.iter().filter_map(|edge| self.control_edge(edge)).collect()
    }

    /// Raw data edges with both endpoints normalized; dangling ones are dropped.
    pub fn resolve_data_flow(&self, raw: &[DataFlow]) -> Vec<DataFlow> {
        raw.iter().filter_map(|edge| self.data_edge(edge)).collect()
    }
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// The entry, every phi exit and every declared output flow of known procs.
pub fn control_sources<T>(
    catalog: &ProcCatalog<T>,
    nodes: &IndexMap<NodeId, Node>,
) -> IndexMap<ControlSourceKey, ControlSource> {
    let mut sources = vec![ControlSource::Entry];
    for node in nodes.values() {
        match node {
            Node::Phi(phi) => sources.push(ControlSource::Phi { node: phi.clone() }),
            Node::Proc(proc_node) => {
                if let Some(proc) = catalog.get(&proc_node.proc) {
                    for flow in proc.output_flows.keys() {
                        sources.push(ControlSource::Flow {
                            node: proc_node.clone(),
                            flow: flow.clone(),
                        });
                    }
                }
            }
        }
    }
    sources.into_iter().map(|s| (s.key(), s)).collect()
}

/// Every node input (phi or known proc) and every declared output flow.
pub fn control_sinks<T>(
    graph: &Graph<T>,
    catalog: &ProcCatalog<T>,
    nodes: &IndexMap<NodeId, Node>,
) -> IndexMap<ControlSinkKey, ControlSink> {
    let node_sinks = nodes
        .values()
        .filter(|node| match node {
            Node::Phi(_) => true,
            Node::Proc(proc_node) => catalog.contains(&proc_node.proc),
        })
        .map(|node| ControlSink::Node { node: node.clone() });
    let exits = graph
        .output_flows
        .keys()
        .map(|flow| ControlSink::Exit { flow: flow.clone() });

    node_sinks.chain(exits).map(|s| (s.key(), s)).collect()
}

/// Graph inputs plus every output slot of every enumerated proc flow.
pub fn symbol_sources<'a, T: 'a>(
    graph: &Graph<T>,
    catalog: &ProcCatalog<T>,
    control_sources: impl Iterator<Item = &'a ControlSource>,
) -> IndexMap<SymbolSourceKey, SymbolSource> {
    let mut sources: Vec<SymbolSource> = graph
        .inputs
        .keys()
        .map(|name| SymbolSource::Input { name: name.clone() })
        .collect();

    for source in control_sources {
        let ControlSource::Flow { node, flow } = source else {
            continue;
        };
        let Some(slots) = catalog.get(&node.proc).and_then(|p| p.flow_slots(flow)) else {
            continue;
        };
        for slot in slots.keys() {
            sources.push(SymbolSource::Output {
                node: node.clone(),
                flow: flow.clone(),
                slot: slot.clone(),
            });
        }
    }
    sources.into_iter().map(|s| (s.key(), s)).collect()
}

/// Every input slot of every enumerated proc node plus every graph output slot.
pub fn symbol_sinks<'a, T: 'a>(
    graph: &Graph<T>,
    catalog: &ProcCatalog<T>,
    control_sinks: impl Iterator<Item = &'a ControlSink>,
) -> IndexMap<SymbolSinkKey, SymbolSink> {
    let mut sinks = Vec::new();
    for sink in control_sinks {
        match sink {
            ControlSink::Node {
                node: Node::Proc(proc_node),
            } => {
                let Some(proc) = catalog.get(&proc_node.proc) else {
                    continue;
                };
                for slot in proc.inputs.keys() {
                    sinks.push(SymbolSink::Input {
                        node: proc_node.clone(),
                        slot: slot.clone(),
                    });
                }
            }
            ControlSink::Node { node: Node::Phi(_) } => {}
            ControlSink::Exit { flow } => {
                let Some(slots) = graph.output_flows.get(flow) else {
                    continue;
                };
                for slot in slots.keys() {
                    sinks.push(SymbolSink::Output {
                        flow: flow.clone(),
                        slot: slot.clone(),
                    });
                }
            }
        }
    }
    sinks.into_iter().map(|s| (s.key(), s)).collect()
}
