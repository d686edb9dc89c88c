//! Search scenarios on small catalogs.

use proptest::prelude::*;

use flowsynth_check::interpreter::{ImplTable, Value};
use flowsynth_check::test_support::{boundary, context_with, sample_for, t, values};
use flowsynth_check::Sample;
use flowsynth_core::{
    ControlFlow, ControlSink, ControlSource, DataFlow, Graph, NodeId, Proc, ProcCatalog, ProcNode,
    SymbolSink, SymbolSource, TypeName,
};
use flowsynth_synth::{SynthesisConfig, SynthesisExt, Synthesizer};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_string_catalog() -> ProcCatalog<TypeName> {
    ProcCatalog::new().with(
        "toString",
        Proc::new(true)
            .input("value", t("Int"))
            .output("ok", "text", t("String")),
    )
}

// ---------------------------------------------------------------------------
// Insertion
// ---------------------------------------------------------------------------

#[test]
fn inserts_to_string_between_input_and_output() {
    let catalog = to_string_catalog();
    let sample = sample_for(&catalog, 5, Value::from("5"));
    let ctx = context_with(boundary("String"), catalog, vec![sample]);

    let solution = ctx.synthesize(None).expect("a solution");
    assert_eq!(solution.score(), 1.0);

    let node = ProcNode::new(NodeId(0), "toString");
    let control: Vec<_> = solution.control_flow().iter().map(ControlFlow::key).collect();
    assert!(control.contains(&ControlFlow::new(ControlSource::Entry, ControlSink::node(node.clone())).key()));
    assert!(control.contains(&ControlFlow::new(ControlSource::flow(node.clone(), "ok"), ControlSink::exit("done")).key()));
    let data: Vec<_> = solution.data_flow().iter().map(DataFlow::key).collect();
    assert!(data.contains(&DataFlow::new(SymbolSource::input("x"), SymbolSink::input(node.clone(), "value")).key()));
    assert!(data.contains(&DataFlow::new(SymbolSource::output(node, "ok", "text"), SymbolSink::output("done", "y")).key()));
}

// ---------------------------------------------------------------------------
// Ambiguity
// ---------------------------------------------------------------------------

fn two_inputs() -> Graph<TypeName> {
    Graph::new()
        .input("a", t("Int"))
        .input("b", t("Int"))
        .output_slot("done", "y", t("Int"))
        .with_control_edge(ControlSource::Entry, ControlSink::exit("done"))
}

fn pick_sample(a: i64, b: i64, y: i64) -> Sample {
    Sample {
        input: values(&[("a", Value::Int(a)), ("b", Value::Int(b))]),
        output: values(&[("y", Value::Int(y))]),
        output_flow: "done".into(),
        impls: ImplTable::new(),
    }
}

#[test]
fn each_candidate_symbol_is_its_own_successor() {
    let ctx = context_with(two_inputs(), ProcCatalog::new(), vec![]);
    let next = ctx.synthesize_next_generation();
    let sources: Vec<_> = next.iter().map(|c| c.data_flow()[0].source.clone()).collect();
    assert_eq!(sources, [SymbolSource::input("a"), SymbolSource::input("b")]);
}

#[test]
fn samples_decide_between_candidates() {
    let ctx = context_with(two_inputs(), ProcCatalog::new(), vec![pick_sample(1, 2, 2)]);
    let solution = ctx.synthesize(None).expect("a solution");
    assert_eq!(solution.data_flow()[0].source, SymbolSource::input("b"));
}

#[test]
fn population_cap_applies_after_scoring() {
    // Both candidates come out of one expansion and are scored before the
    // population is cut, so a cap of one cannot hide the right one.
    let ctx = context_with(two_inputs(), ProcCatalog::new(), vec![pick_sample(1, 2, 2)]);
    let mut synth = Synthesizer::new(SynthesisConfig {
        max_population: Some(1),
        max_expansions: None,
    });
    assert!(synth.synthesize(&ctx).is_some());
    assert_eq!(synth.stats().discarded, 0);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Whatever the search returns scores 1 and compiles.
    #[test]
    fn solutions_are_verified(x in -1000i64..1000, pick_b in any::<bool>()) {
        let y = if pick_b { x + 1 } else { x };
        let ctx = context_with(two_inputs(), ProcCatalog::new(), vec![pick_sample(x, x + 1, y)]);
        let solution = ctx.synthesize(Some(4));
        prop_assert!(solution.is_some());
        let solution = solution.unwrap();
        prop_assert_eq!(solution.score(), 1.0);
        prop_assert!(solution.can_generate_working_code());
        prop_assert!(solution.matches_samples());
    }

    /// Expanding never changes the context being expanded.
    #[test]
    fn expansion_is_pure(with_edge in any::<bool>()) {
        let mut graph = boundary("String");
        if with_edge {
            graph = graph.with_control_edge(ControlSource::Entry, ControlSink::exit("done"));
        }
        let ctx = context_with(graph.clone(), to_string_catalog(), vec![]);
        let problems = ctx.problems().to_vec();
        let _ = ctx.synthesize_next_generation();
        prop_assert_eq!(ctx.graph(), &graph);
        prop_assert_eq!(ctx.problems(), problems.as_slice());
    }
}
