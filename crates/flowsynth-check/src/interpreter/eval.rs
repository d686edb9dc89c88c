//! Evaluation of a single continuation.
//!
//! Phis pass control straight through. A proc step gathers its arguments from
//! the values bound so far, calls its implementation, checks that the chosen
//! flow exists and carries every declared slot, and binds the results. Exits
//! collect the graph outputs.

use flowsynth_core::connector::SymbolSourceKey;

use super::error::RuntimeError;
use super::program::{Continuation, Step};
use super::state::{ExecutionState, Interpreter};
use super::trace::TraceEntry;
use super::value::ValueMap;

impl<'p> Interpreter<'p> {
    pub(crate) fn eval(&mut self, at: &Continuation) -> Result<ExecutionState, RuntimeError> {
        let program = self.program;
        match at {
            Continuation::Exit(flow) => {
                let bindings = program.exits.get(flow).ok_or_else(|| RuntimeError::InternalError {
                    message: format!("exit '{flow}' not lowered"),
                })?;
                let mut outputs = ValueMap::new();
                for (slot, source) in bindings {
                    let value = self.values.get(source).ok_or_else(|| RuntimeError::MissingOutput {
                        flow: flow.clone(),
                        slot: slot.clone(),
                    })?;
                    outputs.insert(slot.clone(), value.clone());
                }
                Ok(ExecutionState::Completed {
                    flow: flow.clone(),
                    outputs,
                })
            }
            Continuation::Node(node) => {
                let step = program.steps.get(node).ok_or_else(|| RuntimeError::InternalError {
                    message: format!("node {node} not lowered"),
                })?;
                match step {
                    Step::Phi { next } => Ok(ExecutionState::Running { at: next.clone() }),
                    Step::Proc {
                        proc,
                        imp,
                        inputs,
                        flows,
                    } => {
                        let mut args = ValueMap::new();
                        for (slot, source) in inputs {
                            let value = self.values.get(source).ok_or_else(|| RuntimeError::MissingValue {
                                node: *node,
                                slot: slot.clone(),
                            })?;
                            args.insert(slot.clone(), value.clone());
                        }

                        let outcome = imp.invoke(&args).map_err(|cause| RuntimeError::ProcFailed {
                            node: *node,
                            cause: Box::new(cause),
                        })?;
                        let exit = flows.get(&outcome.flow).ok_or_else(|| RuntimeError::UndeclaredFlow {
                            node: *node,
                            flow: outcome.flow.clone(),
                        })?;

                        let mut produced = ValueMap::new();
                        for slot in &exit.slots {
                            let value = outcome.values.get(slot).ok_or_else(|| {
                                RuntimeError::IncompleteOutcome {
                                    node: *node,
                                    flow: outcome.flow.clone(),
                                    slot: slot.clone(),
                                }
                            })?;
                            produced.insert(slot.clone(), value.clone());
                        }
                        for (slot, value) in &produced {
                            let key = SymbolSourceKey::Output(*node, outcome.flow.clone(), slot.clone());
                            self.values.insert(key, value.clone());
                        }

                        if let Some(trace) = &mut self.trace {
                            trace.push(TraceEntry {
                                node_id: *node,
                                proc: proc.clone(),
                                inputs: args,
                                flow: outcome.flow.clone(),
                                outputs: produced,
                            });
                        }
                        Ok(ExecutionState::Running { at: exit.next.clone() })
                    }
                }
            }
        }
    }
}
