//! Fixtures shared by the unit and integration tests of this crate and of
//! the crates built on it. Enabled by the `test-utils` feature.

use std::sync::Arc;

use flowsynth_core::graph::Graph;
use flowsynth_core::id::NodeId;
use flowsynth_core::node::ProcNode;
use flowsynth_core::nominal::{NominalTypes, TypeName};
use flowsynth_core::proc_def::{Proc, ProcCatalog};

use crate::context::{Environment, GraphContext};
use crate::interpreter::{builtins, ImplTable, Value, ValueMap};
use crate::sample::Sample;

pub fn t(name: &str) -> TypeName {
    TypeName::new(name)
}

/// `toString: Int -> String`, `inc: Int -> Int`, `parse: String -> ok(Int) | err`.
///
/// `parse` is impure; the other two are pure.
pub fn catalog() -> ProcCatalog<TypeName> {
    ProcCatalog::new()
        .with(
            "toString",
            Proc::new(true)
                .input_named("value", t("Int"), &["value", "number"])
                .output_named("ok", "text", t("String"), &["text"], &["value"]),
        )
        .with(
            "inc",
            Proc::new(true)
                .input("value", t("Int"))
                .output_named("ok", "value", t("Int"), &["value"], &["value"]),
        )
        .with(
            "parse",
            Proc::new(false)
                .input("text", t("String"))
                .output("ok", "value", t("Int"))
                .flow("err"),
        )
}

/// Input `x: Int`, output flow `done` with slot `y: String`, no edges.
pub fn scenario_graph() -> Graph<TypeName> {
    boundary("String")
}

/// Input `x: Int`, output flow `done` with slot `y` of type `output`.
pub fn boundary(output: &str) -> Graph<TypeName> {
    Graph::new().input("x", t("Int")).output_slot("done", "y", t(output))
}

pub fn proc_node(id: u32, proc: &str) -> ProcNode {
    ProcNode::new(NodeId(id), proc)
}

pub fn values(pairs: &[(&str, Value)]) -> ValueMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Builtin implementations for whichever fixture procs `catalog` declares.
pub fn impls_for(catalog: &ProcCatalog<TypeName>) -> ImplTable {
    let mut table = ImplTable::new();
    for (id, name) in [("toString", "to_string"), ("inc", "increment"), ("parse", "parse_int")] {
        if let Some(proc) = catalog.get(&id.into()) {
            table.insert(id, builtins::resolve(name, &id.into(), proc).unwrap());
        }
    }
    table
}

pub fn impls() -> ImplTable {
    impls_for(&catalog())
}

/// `x` in, `y` out on `done`.
pub fn sample_for(catalog: &ProcCatalog<TypeName>, x: i64, y: Value) -> Sample {
    Sample {
        input: values(&[("x", Value::Int(x))]),
        output: values(&[("y", y)]),
        output_flow: "done".into(),
        impls: impls_for(catalog),
    }
}

/// `x: 5` turns into `y: "5"` on `done`.
pub fn sample() -> Sample {
    sample_for(&catalog(), 5, Value::from("5"))
}

pub fn env(samples: Vec<Sample>) -> Arc<Environment<NominalTypes>> {
    Arc::new(Environment::new(NominalTypes::new(), catalog()).with_samples(samples))
}

/// A context over the fixture catalog with [`sample`] as its only sample.
pub fn context(graph: Graph<TypeName>) -> GraphContext<NominalTypes> {
    GraphContext::new(graph, env(vec![sample()]))
}

pub fn context_with(
    graph: Graph<TypeName>,
    catalog: ProcCatalog<TypeName>,
    samples: Vec<Sample>,
) -> GraphContext<NominalTypes> {
    let env = Environment::new(NominalTypes::new(), catalog).with_samples(samples);
    GraphContext::new(graph, Arc::new(env))
}

/// A context whose samples expect `y == x.to_string()` for `x` in 5 and 12.
pub fn to_string_context(graph: Graph<TypeName>, catalog: ProcCatalog<TypeName>) -> GraphContext<NominalTypes> {
    let samples = [5, 12]
        .into_iter()
        .map(|x| sample_for(&catalog, x, Value::Str(x.to_string())))
        .collect();
    context_with(graph, catalog, samples)
}
