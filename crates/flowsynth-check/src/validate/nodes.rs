//! Node validity: catalog references and node shapes.

use indexmap::IndexSet;

use flowsynth_core::connector::{ControlSource, SymbolSink, SymbolSource};
use flowsynth_core::graph::{Graph, NodeTable};
use flowsynth_core::id::{FlowId, NodeId};
use flowsynth_core::node::Node;
use flowsynth_core::proc_def::ProcCatalog;

use super::problem::{GraphComponent, GraphProblem, ProblemKind};

/// Reports unknown procs, conflicting node mentions, and edge endpoints
/// naming flows or slots their node's proc does not declare.
pub fn check_nodes<T>(
    graph: &Graph<T>,
    catalog: &ProcCatalog<T>,
    table: &NodeTable,
    problems: &mut Vec<GraphProblem>,
) {
    for node in table.nodes.values() {
        if let Node::Proc(proc_node) = node {
            if !catalog.contains(&proc_node.proc) {
                problems.push(GraphProblem::new(
                    ProblemKind::UnknownProc {
                        node: proc_node.id,
                        proc: proc_node.proc.clone(),
                    },
                    GraphComponent::Node(node.clone()),
                ));
            }
        }
    }

    for (first, second) in &table.conflicts {
        problems.push(GraphProblem::new(
            ProblemKind::ConflictingNode {
                node: first.id(),
                first: first.to_string(),
                second: second.to_string(),
            },
            GraphComponent::Node(second.clone()),
        ));
    }

    check_shapes(graph, catalog, table, problems);
}

/// A flow or slot some edge uses on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Port {
    Flow(FlowId),
    Output(FlowId, String),
    Input(String),
}

fn check_shapes<T>(
    graph: &Graph<T>,
    catalog: &ProcCatalog<T>,
    table: &NodeTable,
    problems: &mut Vec<GraphProblem>,
) {
    let mut used: IndexSet<(NodeId, Port)> = IndexSet::new();
    for edge in &graph.control_flow {
        if let ControlSource::Flow { node, flow } = &edge.source {
            used.insert((node.id, Port::Flow(flow.clone())));
        }
    }
    for edge in &graph.data_flow {
        if let SymbolSource::Output { node, flow, slot } = &edge.source {
            used.insert((node.id, Port::Output(flow.clone(), slot.clone())));
        }
        if let SymbolSink::Input { node, slot } = &edge.target {
            used.insert((node.id, Port::Input(slot.clone())));
        }
    }

    for (node_id, port) in used {
        // Unknown procs and phi/proc conflicts are reported above.
        let Some(Node::Proc(proc_node)) = table.nodes.get(&node_id) else {
            continue;
        };
        let Some(proc) = catalog.get(&proc_node.proc) else {
            continue;
        };
        let kind = match port {
            Port::Flow(flow) if proc.flow_slots(&flow).is_none() => ProblemKind::UnknownFlow {
                node: node_id,
                proc: proc_node.proc.clone(),
                flow,
            },
            Port::Output(flow, _) if proc.flow_slots(&flow).is_none() => ProblemKind::UnknownFlow {
                node: node_id,
                proc: proc_node.proc.clone(),
                flow,
            },
            Port::Output(flow, slot) if proc.output_slot(&flow, &slot).is_none() => {
                ProblemKind::UnknownSlot {
                    node: node_id,
                    proc: proc_node.proc.clone(),
                    slot: format!("{flow}.{slot}"),
                }
            }
            Port::Input(slot) if proc.input_slot(&slot).is_none() => ProblemKind::UnknownSlot {
                node: node_id,
                proc: proc_node.proc.clone(),
                slot,
            },
            _ => continue,
        };
        problems.push(GraphProblem::new(
            kind,
            GraphComponent::Node(Node::Proc(proc_node.clone())),
        ));
    }
}
