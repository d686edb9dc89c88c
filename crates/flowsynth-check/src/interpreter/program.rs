//! Lowering a validated graph into a runnable [`Program`].
//!
//! A program is the graph with every connection resolved ahead of time: each
//! node becomes a [`Step`] that knows where its arguments come from and where
//! control goes next on each of its flows, and each graph exit knows where its
//! output values come from. Values are addressed by the symbol source that
//! produced them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use flowsynth_core::connector::{ControlSink, ControlSource, SymbolSink, SymbolSourceKey};
use flowsynth_core::id::{FlowId, NodeId, ProcId};
use flowsynth_core::node::Node;
use flowsynth_core::types::TypeSystem;

use super::error::{BridgeError, RuntimeError};
use super::impls::{ImplTable, ProcImpl};
use super::state::{ExecutionState, Interpreter, InterpreterConfig};
use super::trace::TraceEntry;
use super::value::ValueMap;
use crate::analysis::traversal::{edge_source_to_sink, edge_symbol_sink_to_source};
use crate::analysis::Analysis;
use crate::context::GraphContext;

/// Where control goes next.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Continuation {
    Node(NodeId),
    Exit(FlowId),
}

/// One output flow of a proc step.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowExit {
    /// Slots the implementation must produce on this flow.
    pub slots: Vec<String>,
    pub next: Continuation,
}

/// What happens when control reaches a node.
#[derive(Clone)]
pub enum Step {
    Phi {
        next: Continuation,
    },
    Proc {
        proc: ProcId,
        imp: Arc<dyn ProcImpl>,
        /// Argument sources by input slot, in declaration order.
        inputs: Vec<(String, SymbolSourceKey)>,
        flows: IndexMap<FlowId, FlowExit>,
    },
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Phi { next } => f.debug_struct("Phi").field("next", next).finish(),
            Step::Proc {
                proc,
                inputs,
                flows,
                ..
            } => f
                .debug_struct("Proc")
                .field("proc", proc)
                .field("inputs", inputs)
                .field("flows", flows)
                .finish(),
        }
    }
}

/// Handlers for a program's output flows, by flow id.
pub type FlowHandlers<'a> = HashMap<FlowId, Box<dyn FnMut(&ValueMap) + 'a>>;

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub flow: FlowId,
    pub outputs: ValueMap,
    /// Proc invocations in order, when tracing is enabled.
    pub trace: Option<Vec<TraceEntry>>,
}

/// A lowered, runnable graph.
#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) inputs: Vec<String>,
    pub(crate) entry: Continuation,
    pub(crate) steps: IndexMap<NodeId, Step>,
    pub(crate) exits: IndexMap<FlowId, Vec<(String, SymbolSourceKey)>>,
    pub(crate) config: InterpreterConfig,
}

impl Program {
    pub fn entry(&self) -> &Continuation {
        &self.entry
    }

    /// Runs the program to completion.
    pub fn run(&self, inputs: &ValueMap) -> Result<Completion, RuntimeError> {
        let mut interp = Interpreter::new(self);
        interp.start(inputs);
        interp.run();
        let trace = interp.take_trace();
        match interp.into_state() {
            ExecutionState::Completed { flow, outputs } => Ok(Completion {
                flow,
                outputs,
                trace,
            }),
            ExecutionState::Error { error } => Err(error),
            other => Err(RuntimeError::InternalError {
                message: format!("run stopped in state {other:?}"),
            }),
        }
    }

    /// Runs the program and passes the outputs to the handler of the flow
    /// it ended on.
    pub fn invoke(&self, inputs: &ValueMap, handlers: &mut FlowHandlers<'_>) -> Result<(), RuntimeError> {
        let completion = self.run(inputs)?;
        let handler = handlers
            .get_mut(&completion.flow)
            .ok_or_else(|| RuntimeError::UnhandledFlow {
                flow: completion.flow.clone(),
            })?;
        handler(&completion.outputs);
        Ok(())
    }
}

/// Lowers `ctx` using `impls` for its procs.
///
/// Fails when the graph cannot generate working code, or when a proc has no
/// implementation.
pub fn compile<S: TypeSystem>(ctx: &GraphContext<S>, impls: &ImplTable) -> Result<Program, BridgeError> {
    if !ctx.can_generate_working_code() {
        let errors = ctx.problems().iter().filter(|p| p.is_error()).count();
        return Err(BridgeError::NotWorking { errors });
    }
    let analysis = ctx.analysis();
    let catalog = ctx.catalog();

    let entry = follow(analysis, &ControlSource::Entry)?;

    let mut steps = IndexMap::new();
    for (id, node) in &analysis.nodes.nodes {
        let step = match node {
            Node::Phi(phi) => Step::Phi {
                next: follow(analysis, &ControlSource::Phi { node: phi.clone() })?,
            },
            Node::Proc(proc_node) => {
                let proc = catalog.get(&proc_node.proc).ok_or_else(|| BridgeError::UnknownProc {
                    proc: proc_node.proc.clone(),
                })?;
                let imp = impls
                    .get(&proc_node.proc)
                    .cloned()
                    .ok_or_else(|| BridgeError::MissingImpl {
                        proc: proc_node.proc.clone(),
                    })?;
                let mut inputs = Vec::with_capacity(proc.inputs.len());
                for slot in proc.inputs.keys() {
                    let source = feed(analysis, &SymbolSink::input(proc_node.clone(), slot))?;
                    inputs.push((slot.clone(), source));
                }
                let mut flows = IndexMap::new();
                for (flow, slots) in &proc.output_flows {
                    let next = follow(analysis, &ControlSource::flow(proc_node.clone(), flow.clone()))?;
                    let slots = slots.keys().cloned().collect();
                    flows.insert(flow.clone(), FlowExit { slots, next });
                }
                Step::Proc {
                    proc: proc_node.proc.clone(),
                    imp,
                    inputs,
                    flows,
                }
            }
        };
        steps.insert(*id, step);
    }

    let mut exits = IndexMap::new();
    for (flow, slots) in &ctx.graph().output_flows {
        let mut bindings = Vec::with_capacity(slots.len());
        for slot in slots.keys() {
            bindings.push((slot.clone(), feed(analysis, &SymbolSink::output(flow.clone(), slot))?));
        }
        exits.insert(flow.clone(), bindings);
    }

    Ok(Program {
        inputs: ctx.graph().inputs.keys().cloned().collect(),
        entry,
        steps,
        exits,
        config: ctx.env().interpreter.clone(),
    })
}

fn follow<T>(analysis: &Analysis<T>, source: &ControlSource) -> Result<Continuation, BridgeError> {
    match edge_source_to_sink(source, &analysis.control_flow) {
        Some(ControlSink::Node { node }) => Ok(Continuation::Node(node.id())),
        Some(ControlSink::Exit { flow }) => Ok(Continuation::Exit(flow.clone())),
        None => Err(BridgeError::Unwired {
            connector: source.to_string(),
        }),
    }
}

fn feed<T>(analysis: &Analysis<T>, sink: &SymbolSink) -> Result<SymbolSourceKey, BridgeError> {
    edge_symbol_sink_to_source(sink, &analysis.data_flow)
        .map(|source| source.key())
        .ok_or_else(|| BridgeError::Unwired {
            connector: sink.to_string(),
        })
}
