//! Graph interpreter: the bridge from a validated graph to something runnable.
//!
//! # Architecture
//!
//! - [`compile`] lowers a [`GraphContext`] without errors into a [`Program`],
//!   binding every proc node to an implementation from an [`ImplTable`].
//! - [`Interpreter`] walks a program with a state machine:
//!   `Ready -> Running -> (Completed | Error)`.
//! - [`Program::invoke`] runs to completion and hands the outputs to the
//!   handler registered for the flow the run ended on.
//! - [`Value`] is the runtime representation of all values.
//! - [`RuntimeError`] captures faults (missing values, failing procs, step
//!   limit). [`BridgeError`] captures failures to lower.
//! - [`TraceEntry`] records each proc invocation when tracing is enabled.
//!
//! # Usage
//!
//! ```ignore
//! let program = compile(&ctx, &impls)?;
//! let mut handlers: FlowHandlers = HashMap::new();
//! handlers.insert("done".into(), Box::new(|out| println!("{out:?}")));
//! program.invoke(&inputs, &mut handlers)?;
//! ```
//!
//! [`GraphContext`]: crate::context::GraphContext

pub mod builtins;
pub mod error;
pub mod eval;
pub mod impls;
pub mod program;
pub mod state;
pub mod trace;
pub mod value;

pub use error::{BridgeError, RuntimeError};
pub use impls::{FnImpl, ImplTable, ProcImpl, ProcOutcome};
pub use program::{compile, Completion, Continuation, FlowExit, FlowHandlers, Program, Step};
pub use state::{ExecutionState, Interpreter, InterpreterConfig};
pub use trace::TraceEntry;
pub use value::{Value, ValueMap};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::context::{Environment, GraphContext};
    use crate::test_support::{catalog, context, impls, proc_node, scenario_graph, t, values};
    use flowsynth_core::connector::{ControlSink, ControlSource, SymbolSink, SymbolSource};
    use flowsynth_core::graph::Graph;
    use flowsynth_core::id::NodeId;
    use flowsynth_core::node::PhiNode;
    use flowsynth_core::nominal::{NominalTypes, TypeName};

    fn to_string_graph() -> Graph<TypeName> {
        let to_string = proc_node(1, "toString");
        scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::node(to_string.clone()))
            .with_control_edge(ControlSource::flow(to_string.clone(), "ok"), ControlSink::exit("done"))
            .with_data_edge(SymbolSource::input("x"), SymbolSink::input(to_string.clone(), "value"))
            .with_data_edge(SymbolSource::output(to_string, "ok", "text"), SymbolSink::output("done", "y"))
    }

    #[test]
    fn lowers_and_runs() {
        let ctx = context(to_string_graph());
        let program = compile(&ctx, &impls()).unwrap();
        assert_eq!(program.entry(), &Continuation::Node(NodeId(1)));

        let completion = program.run(&values(&[("x", Value::Int(5))])).unwrap();
        assert_eq!(completion.flow, "done".into());
        assert_eq!(completion.outputs, values(&[("y", Value::from("5"))]));
        assert_eq!(completion.trace, None);
    }

    #[test]
    fn invoke_calls_the_matching_handler() {
        let ctx = context(to_string_graph());
        let program = compile(&ctx, &impls()).unwrap();

        let mut seen = Vec::new();
        {
            let mut handlers: FlowHandlers = HashMap::new();
            handlers.insert("done".into(), Box::new(|out: &ValueMap| seen.push(out.clone())));
            program
                .invoke(&values(&[("x", Value::Int(12))]), &mut handlers)
                .unwrap();
        }
        assert_eq!(seen, vec![values(&[("y", Value::from("12"))])]);

        let err = program
            .invoke(&values(&[("x", Value::Int(1))]), &mut HashMap::new())
            .unwrap_err();
        assert_eq!(err, RuntimeError::UnhandledFlow { flow: "done".into() });
    }

    #[test]
    fn tracing_records_proc_calls() {
        let env = Environment::new(NominalTypes::new(), catalog()).with_interpreter(InterpreterConfig {
            trace_enabled: true,
            ..InterpreterConfig::default()
        });
        let ctx = GraphContext::new(to_string_graph(), Arc::new(env));
        let completion = compile(&ctx, &impls())
            .unwrap()
            .run(&values(&[("x", Value::Int(7))]))
            .unwrap();
        let trace = completion.trace.unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].proc, "toString".into());
        assert_eq!(trace[0].inputs, values(&[("value", Value::Int(7))]));
        assert_eq!(trace[0].outputs, values(&[("text", Value::from("7"))]));
    }

    #[test]
    fn graphs_with_errors_do_not_compile() {
        let ctx = context(scenario_graph());
        assert_eq!(
            compile(&ctx, &impls()).unwrap_err(),
            BridgeError::NotWorking { errors: 2 }
        );
    }

    #[test]
    fn every_proc_needs_an_impl() {
        let ctx = context(to_string_graph());
        assert_eq!(
            compile(&ctx, &ImplTable::new()).unwrap_err(),
            BridgeError::MissingImpl { proc: "toString".into() }
        );
    }

    #[test]
    fn missing_input_faults() {
        let program = compile(&context(to_string_graph()), &impls()).unwrap();
        assert_eq!(
            program.run(&ValueMap::new()).unwrap_err(),
            RuntimeError::MissingInput { name: "x".into() }
        );
    }

    #[test]
    fn proc_faults_name_their_node() {
        let failing = ImplTable::new().with_fn("toString", |_| {
            Err(RuntimeError::Fault {
                message: "boom".into(),
            })
        });
        let program = compile(&context(to_string_graph()), &failing).unwrap();
        let err = program.run(&values(&[("x", Value::Int(1))])).unwrap_err();
        assert_eq!(err.to_string(), "proc at node 1 failed: boom");
    }

    #[test]
    fn endless_loops_hit_the_step_limit() {
        let inc = proc_node(1, "inc");
        let phi = PhiNode { id: NodeId(2) };
        let graph = Graph::new()
            .input("x", t("Int"))
            .output_flow("done")
            .with_control_edge(ControlSource::Entry, ControlSink::node(phi.clone()))
            .with_control_edge(ControlSource::Phi { node: phi.clone() }, ControlSink::node(inc.clone()))
            .with_control_edge(ControlSource::flow(inc.clone(), "ok"), ControlSink::node(phi))
            .with_data_edge(SymbolSource::input("x"), SymbolSink::input(inc, "value"));
        let ctx = context(graph);
        assert!(ctx.can_generate_working_code(), "{:?}", ctx.problems());

        let program = compile(&ctx, &impls()).unwrap();
        assert_eq!(
            program.run(&values(&[("x", Value::Int(0))])).unwrap_err(),
            RuntimeError::StepLimitExceeded { limit: 10_000 }
        );
    }
}
