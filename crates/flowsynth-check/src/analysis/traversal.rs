//! Adjacency queries.
//!
//! The `node_*` helpers look at connector sets only: they relate connectors
//! that share an owner (the same node, or the graph boundary), i.e. the
//! points one can get to by passing through that owner, regardless of which
//! edges exist. The `edge_*` helpers follow resolved edges.

use flowsynth_core::connector::{ControlSink, ControlSource, SymbolSink, SymbolSource};
use flowsynth_core::edge::{ControlFlow, DataFlow};

use super::connectors::Connectors;

/// Sinks owned by the same node (or boundary) as `x`.
pub fn node_source_to_sinks<'a>(x: &ControlSource, connectors: &'a Connectors) -> Vec<&'a ControlSink> {
    let owner = x.owner();
    connectors
        .control_sinks
        .values()
        .filter(|sink| sink.owner() == owner)
        .collect()
}

/// Sources owned by the same node (or boundary) as `x`, `x` included.
pub fn node_source_to_sources<'a>(
    x: &ControlSource,
    connectors: &'a Connectors,
) -> Vec<&'a ControlSource> {
    let owner = x.owner();
    connectors
        .control_sources
        .values()
        .filter(|source| source.owner() == owner)
        .collect()
}

/// Sinks owned by the same node (or boundary) as `x`, `x` included.
pub fn node_sink_to_sinks<'a>(x: &ControlSink, connectors: &'a Connectors) -> Vec<&'a ControlSink> {
    let owner = x.owner();
    connectors
        .control_sinks
        .values()
        .filter(|sink| sink.owner() == owner)
        .collect()
}

/// Sources owned by the same node (or boundary) as `x`: where control can
/// continue after arriving at `x`.
pub fn node_sink_to_sources<'a>(x: &ControlSink, connectors: &'a Connectors) -> Vec<&'a ControlSource> {
    let owner = x.owner();
    connectors
        .control_sources
        .values()
        .filter(|source| source.owner() == owner)
        .collect()
}

/// The first resolved edge arriving at `x`, by its source.
pub fn edge_sink_to_source<'a>(x: &ControlSink, control_flow: &'a [ControlFlow]) -> Option<&'a ControlSource> {
    let key = x.key();
    control_flow
        .iter()
        .find(|edge| edge.target.key() == key)
        .map(|edge| &edge.source)
}

/// The first resolved edge leaving `x`, by its target.
pub fn edge_source_to_sink<'a>(x: &ControlSource, control_flow: &'a [ControlFlow]) -> Option<&'a ControlSink> {
    let key = x.key();
    control_flow
        .iter()
        .find(|edge| edge.source.key() == key)
        .map(|edge| &edge.target)
}

/// The symbol feeding `x`, if connected.
pub fn edge_symbol_sink_to_source<'a>(x: &SymbolSink, data_flow: &'a [DataFlow]) -> Option<&'a SymbolSource> {
    let key = x.key();
    data_flow
        .iter()
        .find(|edge| edge.target.key() == key)
        .map(|edge| &edge.source)
}

/// The first sink `x` feeds, if connected.
pub fn edge_symbol_source_to_sink<'a>(x: &SymbolSource, data_flow: &'a [DataFlow]) -> Option<&'a SymbolSink> {
    let key = x.key();
    data_flow
        .iter()
        .find(|edge| edge.source.key() == key)
        .map(|edge| &edge.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, proc_node, scenario_graph};

    #[test]
    fn node_queries_group_by_owner() {
        let parse = proc_node(1, "parse");
        let graph = scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::node(parse.clone()));
        let connectors = Connectors::enumerate(&graph, &catalog(), &graph.nodes().nodes);

        let input = ControlSink::node(parse.clone());
        assert_eq!(node_sink_to_sources(&input, &connectors).len(), 2);
        assert_eq!(node_sink_to_sinks(&input, &connectors), vec![&input]);

        let ok = ControlSource::flow(parse, "ok");
        assert_eq!(node_source_to_sinks(&ok, &connectors), vec![&input]);
        assert_eq!(node_source_to_sources(&ok, &connectors).len(), 2);

        // The boundary: entry relates to the graph's exits.
        assert_eq!(
            node_source_to_sinks(&ControlSource::Entry, &connectors),
            vec![&ControlSink::exit("done")]
        );
    }

    #[test]
    fn edge_queries_follow_edges() {
        let graph = scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::exit("done"));
        let connectors = Connectors::enumerate(&graph, &catalog(), &graph.nodes().nodes);
        let control_flow = connectors.resolve_control_flow(&graph.control_flow);

        assert_eq!(
            edge_sink_to_source(&ControlSink::exit("done"), &control_flow),
            Some(&ControlSource::Entry)
        );
        assert_eq!(
            edge_source_to_sink(&ControlSource::Entry, &control_flow),
            Some(&ControlSink::exit("done"))
        );
        assert_eq!(edge_symbol_sink_to_source(&SymbolSink::output("done", "y"), &[]), None);
    }
}
