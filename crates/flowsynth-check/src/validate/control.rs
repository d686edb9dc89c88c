//! Control-flow well-formedness.

use indexmap::IndexMap;

use flowsynth_core::connector::{ControlSinkKey, ControlSourceKey};

use super::problem::{GraphComponent, GraphProblem, ProblemKind};
use crate::analysis::{Analysis, ControlPoint};

/// Checks edge counts on every canonical control connector and reports
/// sinks the entry cannot reach.
pub fn check_control_flow<T>(analysis: &Analysis<T>, problems: &mut Vec<GraphProblem>) {
    let connectors = &analysis.connectors;

    let mut outgoing: IndexMap<ControlSourceKey, usize> = IndexMap::new();
    let mut incoming: IndexMap<ControlSinkKey, usize> = IndexMap::new();
    for edge in &analysis.control_flow {
        *outgoing.entry(edge.source.key()).or_default() += 1;
        *incoming.entry(edge.target.key()).or_default() += 1;
    }

    for (key, source) in &connectors.control_sources {
        match outgoing.get(key).copied().unwrap_or(0) {
            0 => problems.push(GraphProblem::new(
                ProblemKind::UnconnectedControlSource {
                    connector: source.to_string(),
                },
                GraphComponent::ControlSource(source.clone()),
            )),
            1 => {}
            count => problems.push(GraphProblem::new(
                ProblemKind::DuplicateControlSource {
                    connector: source.to_string(),
                    count,
                },
                GraphComponent::ControlSource(source.clone()),
            )),
        }
    }

    let reached = analysis.control.reachable_from_entry();
    for (key, sink) in &connectors.control_sinks {
        let count = incoming.get(key).copied().unwrap_or(0);
        if count > 1 && !sink.is_merge() {
            problems.push(GraphProblem::new(
                ProblemKind::DuplicateControlSink {
                    sink: sink.to_string(),
                    count,
                },
                GraphComponent::ControlSink(sink.clone()),
            ));
        }
        if !reached.contains(&ControlPoint::Sink(key.clone())) {
            problems.push(GraphProblem::new(
                ProblemKind::UnreachedControlSink {
                    sink: sink.to_string(),
                },
                GraphComponent::ControlSink(sink.clone()),
            ));
        }
    }
}
