//! Data-flow checks: type correctness, sink connections and availability.

use indexmap::IndexMap;

use flowsynth_core::connector::SymbolSinkKey;
use flowsynth_core::graph::Graph;
use flowsynth_core::proc_def::ProcCatalog;
use flowsynth_core::types::TypeSystem;

use super::problem::{GraphComponent, GraphProblem, ProblemKind};
use crate::analysis::{symbol_sink_type, symbol_source_type, Analysis};

/// Reports ill-typed data edges and symbol sinks with zero or several
/// incoming data edges.
pub fn check_data_flow<S: TypeSystem>(
    graph: &Graph<S::Type>,
    catalog: &ProcCatalog<S::Type>,
    types: &S,
    analysis: &Analysis<S::Type>,
    problems: &mut Vec<GraphProblem>,
) {
    let mut incoming: IndexMap<SymbolSinkKey, usize> = IndexMap::new();
    for edge in &analysis.data_flow {
        *incoming.entry(edge.target.key()).or_default() += 1;

        let actual = symbol_source_type(graph, catalog, &edge.source);
        let expected = symbol_sink_type(graph, catalog, &edge.target);
        if let (Some(actual), Some(expected)) = (actual, expected) {
            if !types.is_assignable(&actual, &expected) {
                problems.push(GraphProblem::new(
                    ProblemKind::TypeMismatch {
                        symbol: edge.source.to_string(),
                        sink: edge.target.to_string(),
                        expected: types.display(&expected),
                        actual: types.display(&actual),
                    },
                    GraphComponent::DataEdge(edge.clone()),
                ));
            }
        }
    }

    for (key, sink) in &analysis.connectors.symbol_sinks {
        match incoming.get(key).copied().unwrap_or(0) {
            0 => problems.push(GraphProblem::new(
                ProblemKind::UnconnectedSymbolSink {
                    sink: sink.to_string(),
                },
                GraphComponent::SymbolSink(sink.clone()),
            )),
            1 => {}
            count => problems.push(GraphProblem::new(
                ProblemKind::DuplicateSymbolSink {
                    sink: sink.to_string(),
                    count,
                },
                GraphComponent::SymbolSink(sink.clone()),
            )),
        }
    }
}

/// Reports data edges whose source value cannot exist when control arrives
/// at the consuming point.
pub fn check_availability<T>(analysis: &Analysis<T>, problems: &mut Vec<GraphProblem>) {
    for edge in &analysis.data_flow {
        let at = edge.target.control_sink().key();
        if !analysis.market.is_demanded(&at, &edge.source.key()) {
            problems.push(GraphProblem::new(
                ProblemKind::UnavailableSymbol {
                    symbol: edge.source.to_string(),
                    sink: edge.target.to_string(),
                },
                GraphComponent::DataEdge(edge.clone()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, proc_node, scenario_graph};
    use flowsynth_core::connector::{ControlSink, ControlSource, SymbolSink, SymbolSource};
    use flowsynth_core::nominal::NominalTypes;
    use flowsynth_core::TypeName;

    fn check(graph: &Graph<TypeName>, types: &NominalTypes) -> Vec<ProblemKind> {
        let catalog = catalog();
        let analysis = Analysis::run(graph, &catalog);
        let mut problems = Vec::new();
        check_data_flow(graph, &catalog, types, &analysis, &mut problems);
        check_availability(&analysis, &mut problems);
        problems.into_iter().map(|p| p.kind).collect()
    }

    #[test]
    fn mismatch_uses_display_form() {
        let graph = scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::exit("done"))
            .with_data_edge(SymbolSource::input("x"), SymbolSink::output("done", "y"));
        assert_eq!(
            check(&graph, &NominalTypes::new()),
            vec![ProblemKind::TypeMismatch {
                symbol: "graph input 'x'".into(),
                sink: "graph output 'done.y'".into(),
                expected: "String".into(),
                actual: "Int".into(),
            }]
        );
    }

    #[test]
    fn coercions_make_edges_assignable() {
        let graph = scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::exit("done"))
            .with_data_edge(SymbolSource::input("x"), SymbolSink::output("done", "y"));
        let mut types = NominalTypes::new();
        types.declare_coercion("Int", "String").unwrap();
        assert_eq!(check(&graph, &types), vec![]);
    }

    #[test]
    fn sink_connection_counts() {
        let inc = proc_node(1, "inc");
        let graph = scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::node(inc.clone()))
            .with_data_edge(SymbolSource::input("x"), SymbolSink::input(inc.clone(), "value"))
            .with_data_edge(SymbolSource::input("x"), SymbolSink::input(inc, "value"));
        assert_eq!(
            check(&graph, &NominalTypes::new()),
            vec![
                ProblemKind::DuplicateSymbolSink {
                    sink: "#1 (inc) slot 'value'".into(),
                    count: 2,
                },
                ProblemKind::UnconnectedSymbolSink {
                    sink: "graph output 'done.y'".into(),
                },
            ]
        );
    }

    #[test]
    fn consumed_before_produced() {
        let a = proc_node(1, "inc");
        let b = proc_node(2, "inc");
        // a runs before b, yet a consumes b's output.
        let graph = scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::node(a.clone()))
            .with_control_edge(ControlSource::flow(a.clone(), "ok"), ControlSink::node(b.clone()))
            .with_data_edge(SymbolSource::output(b, "ok", "value"), SymbolSink::input(a, "value"));
        let kinds = check(&graph, &NominalTypes::new());
        assert!(kinds.contains(&ProblemKind::UnavailableSymbol {
            symbol: "#2 (inc) output 'ok.value'".into(),
            sink: "#1 (inc) slot 'value'".into(),
        }));
    }
}
