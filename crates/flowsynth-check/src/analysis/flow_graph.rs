//! The control network as a petgraph digraph.
//!
//! Vertices are control points (every canonical source and sink). Edges are
//! the resolved control-flow edges (source -> sink) plus the transitions
//! through nodes: arriving at a node's input leads to each of that node's
//! exits (sink `Node(n)` -> every source owned by `n`). Reachability and the
//! supply/demand market are both traversals of this one graph.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use flowsynth_core::connector::{ControlSinkKey, ControlSourceKey, Owner};
use flowsynth_core::edge::ControlFlow;

use super::connectors::Connectors;

/// A vertex of the control network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlPoint {
    Source(ControlSourceKey),
    Sink(ControlSinkKey),
}

/// Control points wired by resolved edges and node transitions.
#[derive(Debug, Clone)]
pub struct ControlGraph {
    graph: DiGraph<ControlPoint, ()>,
    index: HashMap<ControlPoint, NodeIndex>,
}

impl ControlGraph {
    /// Builds the network from canonical connectors and resolved edges.
    pub fn build(connectors: &Connectors, control_flow: &[ControlFlow]) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for key in connectors.control_sources.keys() {
            let point = ControlPoint::Source(key.clone());
            index.insert(point.clone(), graph.add_node(point));
        }
        for key in connectors.control_sinks.keys() {
            let point = ControlPoint::Sink(key.clone());
            index.insert(point.clone(), graph.add_node(point));
        }

        // Through-node transitions.
        for (key, source) in &connectors.control_sources {
            if let Owner::Node(node_id) = source.owner() {
                let from = index.get(&ControlPoint::Sink(ControlSinkKey::Node(node_id)));
                let to = index.get(&ControlPoint::Source(key.clone()));
                if let (Some(&from), Some(&to)) = (from, to) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        for edge in control_flow {
            let from = index.get(&ControlPoint::Source(edge.source.key()));
            let to = index.get(&ControlPoint::Sink(edge.target.key()));
            if let (Some(&from), Some(&to)) = (from, to) {
                graph.add_edge(from, to, ());
            }
        }

        ControlGraph { graph, index }
    }

    pub fn graph(&self) -> &DiGraph<ControlPoint, ()> {
        &self.graph
    }

    pub fn index_of(&self, point: &ControlPoint) -> Option<NodeIndex> {
        self.index.get(point).copied()
    }

    /// All control points reachable from the graph entry (entry included).
    pub fn reachable_from_entry(&self) -> HashSet<ControlPoint> {
        let mut reached = HashSet::new();
        let Some(start) = self.index_of(&ControlPoint::Source(ControlSourceKey::Entry)) else {
            return reached;
        };
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(ix) = bfs.next(&self.graph) {
            reached.insert(self.graph[ix].clone());
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, proc_node, scenario_graph};
    use flowsynth_core::connector::{ControlSink, ControlSource};
    use flowsynth_core::id::{FlowId, NodeId};

    #[test]
    fn reachability_passes_through_nodes() {
        let inc = proc_node(1, "inc");
        let graph = scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::node(inc.clone()))
            .with_control_edge(ControlSource::flow(inc, "ok"), ControlSink::exit("done"));
        let catalog = catalog();
        let connectors = Connectors::enumerate(&graph, &catalog, &graph.nodes().nodes);
        let control_flow = connectors.resolve_control_flow(&graph.control_flow);

        let reached = ControlGraph::build(&connectors, &control_flow).reachable_from_entry();
        assert!(reached.contains(&ControlPoint::Sink(ControlSinkKey::Node(NodeId(1)))));
        assert!(reached.contains(&ControlPoint::Source(ControlSourceKey::Flow(NodeId(1), FlowId::from("ok")))));
        assert!(reached.contains(&ControlPoint::Sink(ControlSinkKey::Exit(FlowId::from("done")))));
    }

    #[test]
    fn disconnected_nodes_are_unreached() {
        let inc = proc_node(1, "inc");
        let graph = scenario_graph()
            .with_control_edge(ControlSource::flow(inc, "ok"), ControlSink::exit("done"));
        let catalog = catalog();
        let connectors = Connectors::enumerate(&graph, &catalog, &graph.nodes().nodes);
        let control_flow = connectors.resolve_control_flow(&graph.control_flow);

        let reached = ControlGraph::build(&connectors, &control_flow).reachable_from_entry();
        assert_eq!(reached.len(), 1);
        assert!(reached.contains(&ControlPoint::Source(ControlSourceKey::Entry)));
    }
}
