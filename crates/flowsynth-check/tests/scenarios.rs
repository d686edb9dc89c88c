//! End-to-end scenarios: graph in, problems / score / sample verdicts out.

use std::sync::Arc;

use flowsynth_check::interpreter::{Value, ValueMap};
use flowsynth_check::{Environment, GraphContext, ProblemKind, Sample, SampleMessage, Severity};
use flowsynth_check::test_support::{boundary, catalog, context_with, impls_for, proc_node, sample_for, t, values};
use flowsynth_core::{
    ControlSink, ControlSource, Graph, NodeId, NominalTypes, PhiNode, ProcCatalog, SymbolSink,
    SymbolSource,
};

// ---------------------------------------------------------------------------
// Pass-through
// ---------------------------------------------------------------------------

#[test]
fn pass_through_scores_one() {
    let graph = boundary("Int")
        .with_control_edge(ControlSource::Entry, ControlSink::exit("done"))
        .with_data_edge(SymbolSource::input("x"), SymbolSink::output("done", "y"));
    let empty = ProcCatalog::new();
    let samples = vec![sample_for(&empty, 5, Value::Int(5))];
    let ctx = context_with(graph, empty, samples);

    assert!(ctx.problems().is_empty(), "{:?}", ctx.problems());
    assert!(ctx.can_generate_working_code());
    assert_eq!(ctx.score(), 1.0);
}

#[test]
fn pass_through_without_control_is_incomplete() {
    let graph = boundary("Int").with_data_edge(SymbolSource::input("x"), SymbolSink::output("done", "y"));
    let ctx = context_with(graph, ProcCatalog::new(), vec![]);

    let messages: Vec<_> = ctx.problems().iter().map(|p| p.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "control flow leaving entry is not connected",
            "output flow 'done' is not reachable from the entry",
            "graph input 'x' is not available at graph output 'done.y'",
        ]
    );
    assert!(ctx.can_be_fixed_with_synthesis());
    assert!(ctx.score() > 0.0 && ctx.score() < 1.0);
}

// ---------------------------------------------------------------------------
// Type mismatch
// ---------------------------------------------------------------------------

#[test]
fn type_mismatch_is_a_fixable_error() {
    let graph = boundary("String")
        .with_control_edge(ControlSource::Entry, ControlSink::exit("done"))
        .with_data_edge(SymbolSource::input("x"), SymbolSink::output("done", "y"));
    let ctx = context_with(graph, ProcCatalog::new(), vec![]);

    assert_eq!(ctx.problems().len(), 1);
    let problem = &ctx.problems()[0];
    assert_eq!(problem.severity, Severity::Error);
    assert!(!problem.needs_human_intervention);
    assert!(matches!(problem.kind, ProblemKind::TypeMismatch { .. }));
    insta::assert_snapshot!(
        problem.message.as_str(),
        @"type mismatch: graph input 'x' of type Int feeds graph output 'done.y' expecting String"
    );
    assert!(!ctx.can_generate_working_code());
    assert!(ctx.can_be_fixed_with_synthesis());
}

#[test]
fn declared_coercions_satisfy_the_type_check() {
    let mut types = NominalTypes::new();
    types.declare_coercion("Int", "String").unwrap();
    let graph = boundary("String")
        .with_control_edge(ControlSource::Entry, ControlSink::exit("done"))
        .with_data_edge(SymbolSource::input("x"), SymbolSink::output("done", "y"));
    let ctx = GraphContext::new(graph, Arc::new(Environment::new(types, ProcCatalog::new())));

    assert!(ctx.problems().is_empty(), "{:?}", ctx.problems());
}

// ---------------------------------------------------------------------------
// Supply
// ---------------------------------------------------------------------------

#[test]
fn every_same_typed_input_is_on_offer() {
    let graph = Graph::new()
        .input("a", t("Int"))
        .input("b", t("Int"))
        .output_slot("done", "y", t("Int"))
        .with_control_edge(ControlSource::Entry, ControlSink::exit("done"));
    let ctx = context_with(graph, ProcCatalog::new(), vec![]);

    let offered: Vec<_> = ctx
        .get_supply(&ControlSource::Entry)
        .into_iter()
        .map(|symbol| symbol.source.clone())
        .collect();
    assert_eq!(offered, [SymbolSource::input("a"), SymbolSource::input("b")]);
    assert_eq!(ctx.unconnected_symbol_sinks(), [SymbolSink::output("done", "y")]);
}

// ---------------------------------------------------------------------------
// Multi-flow procs and samples
// ---------------------------------------------------------------------------

/// `s: String -> parse -> ok: done(y) | err: failed`.
fn parse_graph() -> Graph<flowsynth_core::TypeName> {
    let parse = proc_node(1, "parse");
    Graph::new()
        .input("s", t("String"))
        .output_slot("done", "y", t("Int"))
        .output_flow("failed")
        .with_control_edge(ControlSource::Entry, ControlSink::node(parse.clone()))
        .with_control_edge(ControlSource::flow(parse.clone(), "ok"), ControlSink::exit("done"))
        .with_control_edge(ControlSource::flow(parse.clone(), "err"), ControlSink::exit("failed"))
        .with_data_edge(SymbolSource::input("s"), SymbolSink::input(parse.clone(), "text"))
        .with_data_edge(SymbolSource::output(parse, "ok", "value"), SymbolSink::output("done", "y"))
}

fn parse_sample(s: &str, flow: &str, output: ValueMap) -> Sample {
    Sample {
        input: values(&[("s", Value::from(s))]),
        output,
        output_flow: flow.into(),
        impls: impls_for(&catalog()),
    }
}

#[test]
fn samples_check_the_flow_taken() {
    let samples = vec![
        parse_sample("42", "done", values(&[("y", Value::Int(42))])),
        parse_sample("nope", "failed", ValueMap::new()),
    ];
    let ctx = context_with(parse_graph(), catalog(), samples);
    assert!(ctx.problems().is_empty(), "{:?}", ctx.problems());
    assert!(ctx.matches_samples());
    assert_eq!(ctx.score(), 1.0);
    assert!(!ctx.as_proc().pure);
}

#[test]
fn wrong_flow_fails_the_sample() {
    let samples = vec![
        parse_sample("42", "done", values(&[("y", Value::Int(42))])),
        parse_sample("nope", "done", values(&[("y", Value::Int(0))])),
    ];
    let ctx = context_with(parse_graph(), catalog(), samples);

    let mut messages = Vec::new();
    assert!(!ctx.matches_samples_with(|m| messages.push(m)));
    assert_eq!(
        messages,
        [SampleMessage::UnexpectedFlow {
            sample: 1,
            expected: "done".into(),
            actual: "failed".into(),
        }]
    );
    assert_eq!(ctx.score(), 0.0);
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

#[test]
fn unreached_components_only_warn() {
    // A wired pass-through, plus an `inc` loop through a phi that the entry
    // never reaches.
    let phi = PhiNode { id: NodeId(3) };
    let inc = proc_node(2, "inc");
    let graph = boundary("Int")
        .with_control_edge(ControlSource::Entry, ControlSink::exit("done"))
        .with_data_edge(SymbolSource::input("x"), SymbolSink::output("done", "y"))
        .with_control_edge(ControlSource::Phi { node: phi.clone() }, ControlSink::node(inc.clone()))
        .with_control_edge(ControlSource::flow(inc.clone(), "ok"), ControlSink::node(phi))
        .with_data_edge(SymbolSource::output(inc.clone(), "ok", "value"), SymbolSink::input(inc, "value"));
    let cat = catalog();
    let samples = vec![sample_for(&cat, 7, Value::Int(7))];
    let ctx = context_with(graph, cat, samples);

    assert_eq!(ctx.problems().len(), 2, "{:?}", ctx.problems());
    assert!(ctx
        .problems()
        .iter()
        .all(|p| p.severity == Severity::Warning && matches!(p.kind, ProblemKind::UnreachedControlSink { .. })));
    assert!(ctx.can_generate_working_code());
    assert!(ctx.matches_samples());
    assert_eq!(ctx.score(), 1.0);
}

// ---------------------------------------------------------------------------
// Loops
// ---------------------------------------------------------------------------

#[test]
fn phi_nodes_merge_control() {
    // entry -> phi; phi -> toString; toString.ok -> done. The phi has one
    // incoming edge here but is still a legal merge point.
    let phi = PhiNode { id: NodeId(2) };
    let to_string = proc_node(1, "toString");
    let graph = boundary("String")
        .with_control_edge(ControlSource::Entry, ControlSink::node(phi.clone()))
        .with_control_edge(ControlSource::Phi { node: phi }, ControlSink::node(to_string.clone()))
        .with_control_edge(ControlSource::flow(to_string.clone(), "ok"), ControlSink::exit("done"))
        .with_data_edge(SymbolSource::input("x"), SymbolSink::input(to_string.clone(), "value"))
        .with_data_edge(SymbolSource::output(to_string, "ok", "text"), SymbolSink::output("done", "y"));
    let cat = catalog();
    let samples = vec![sample_for(&cat, 9, Value::from("9"))];
    let ctx = context_with(graph, cat, samples);

    assert!(ctx.problems().is_empty(), "{:?}", ctx.problems());
    assert_eq!(ctx.node_count(), 2);
    assert_eq!(ctx.score(), 1.0);
}
