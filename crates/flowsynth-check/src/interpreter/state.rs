//! Interpreter state machine: configuration, execution state, and the
//! Interpreter struct with start/step/run.
//!
//! The interpreter walks a [`Program`] one continuation at a time:
//! `Ready -> Running -> (Completed | Error)`. Each step either passes a phi,
//! invokes a proc (binding its results for later steps), or reaches a graph
//! exit and collects the outputs.

use std::collections::HashMap;

use flowsynth_core::connector::SymbolSourceKey;
use flowsynth_core::id::FlowId;

use super::error::RuntimeError;
use super::program::{Continuation, Program};
use super::trace::TraceEntry;
use super::value::{Value, ValueMap};

/// The current state of the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionState {
    /// Ready to start execution (initial state).
    Ready,
    /// Control is about to arrive at `at`.
    Running { at: Continuation },
    /// Control left the graph on `flow`.
    Completed { flow: FlowId, outputs: ValueMap },
    /// Execution halted due to a runtime fault.
    Error { error: RuntimeError },
}

/// Configuration for the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    /// Whether to record execution traces.
    pub trace_enabled: bool,
    /// Maximum number of steps per run. Cyclic control flow that never
    /// reaches an exit faults here. Default: 10_000.
    pub max_steps: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            trace_enabled: false,
            max_steps: 10_000,
        }
    }
}

/// The program interpreter.
pub struct Interpreter<'p> {
    pub(crate) program: &'p Program,
    state: ExecutionState,
    /// Values produced so far, by the symbol source that produced them.
    pub(crate) values: HashMap<SymbolSourceKey, Value>,
    steps: usize,
    pub(crate) trace: Option<Vec<TraceEntry>>,
}

impl<'p> Interpreter<'p> {
    /// Creates a new interpreter in the Ready state.
    pub fn new(program: &'p Program) -> Self {
        let trace = if program.config.trace_enabled {
            Some(Vec::new())
        } else {
            None
        };
        Interpreter {
            program,
            state: ExecutionState::Ready,
            values: HashMap::new(),
            steps: 0,
            trace,
        }
    }

    /// Binds the graph inputs and moves to the entry continuation.
    pub fn start(&mut self, inputs: &ValueMap) {
        for name in &self.program.inputs {
            match inputs.get(name) {
                Some(value) => {
                    self.values
                        .insert(SymbolSourceKey::Input(name.clone()), value.clone());
                }
                None => {
                    self.state = ExecutionState::Error {
                        error: RuntimeError::MissingInput { name: name.clone() },
                    };
                    return;
                }
            }
        }
        self.state = ExecutionState::Running {
            at: self.program.entry.clone(),
        };
    }

    /// Advances execution by one continuation. Returns the new state.
    pub fn step(&mut self) -> &ExecutionState {
        let at = match &self.state {
            ExecutionState::Running { at } => at.clone(),
            _ => return &self.state,
        };

        self.steps += 1;
        if self.steps > self.program.config.max_steps {
            self.state = ExecutionState::Error {
                error: RuntimeError::StepLimitExceeded {
                    limit: self.program.config.max_steps,
                },
            };
            return &self.state;
        }

        self.state = match self.eval(&at) {
            Ok(next) => next,
            Err(error) => ExecutionState::Error { error },
        };
        &self.state
    }

    /// Steps until execution completes or faults.
    pub fn run(&mut self) -> &ExecutionState {
        while matches!(self.state, ExecutionState::Running { .. }) {
            self.step();
        }
        &self.state
    }

    pub fn into_state(self) -> ExecutionState {
        self.state
    }

    pub fn take_trace(&mut self) -> Option<Vec<TraceEntry>> {
        self.trace.take()
    }
}
