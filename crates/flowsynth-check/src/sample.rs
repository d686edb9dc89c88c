//! Recorded example runs and their verification.
//!
//! A [`Sample`] pairs literal inputs with the output flow and output values a
//! correct program produces, plus the implementation to use for every proc.
//! Verification compiles the graph once per sample, runs it with one handler
//! per declared output flow, and reports every deviation as a
//! [`SampleMessage`]. Build failures and runtime faults fail the sample; they
//! never escape verification.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use flowsynth_core::id::{FlowId, ProcId};
use flowsynth_core::proc_def::ProcCatalog;
use flowsynth_core::types::TypeSystem;

use crate::context::GraphContext;
use crate::interpreter::{builtins, compile, BridgeError, FlowHandlers, ImplTable, RuntimeError, ValueMap};

/// One recorded example run.
#[derive(Debug, Clone)]
pub struct Sample {
    pub input: ValueMap,
    pub output: ValueMap,
    pub output_flow: FlowId,
    pub impls: ImplTable,
}

/// Serializable form of a [`Sample`], naming a builtin per proc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSpec {
    #[serde(default)]
    pub input: ValueMap,
    #[serde(default)]
    pub output: ValueMap,
    #[serde(alias = "outputFlow")]
    pub output_flow: FlowId,
    #[serde(rename = "impl", default)]
    pub impls: IndexMap<ProcId, String>,
}

impl SampleSpec {
    /// Resolves builtin names against the procs they implement.
    pub fn resolve<T>(&self, catalog: &ProcCatalog<T>) -> Result<Sample, BridgeError> {
        let mut impls = ImplTable::new();
        for (proc_id, name) in &self.impls {
            let proc = catalog.get(proc_id).ok_or_else(|| BridgeError::UnknownProc {
                proc: proc_id.clone(),
            })?;
            impls.insert(proc_id.clone(), builtins::resolve(name, proc_id, proc)?);
        }
        Ok(Sample {
            input: self.input.clone(),
            output: self.output.clone(),
            output_flow: self.output_flow.clone(),
            impls,
        })
    }
}

/// Why verification failed. `sample` is the index into the environment's
/// sample list.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleMessage {
    CannotGenerateCode,
    BuildFailed {
        sample: usize,
        error: BridgeError,
    },
    RuntimeFault {
        sample: usize,
        error: RuntimeError,
    },
    UnexpectedFlow {
        sample: usize,
        expected: FlowId,
        actual: FlowId,
    },
    OutputMismatch {
        sample: usize,
        expected: ValueMap,
        actual: ValueMap,
    },
    /// The run finished without any output handler being called.
    NoOutput {
        sample: usize,
    },
}

impl SampleMessage {
    pub fn sample(&self) -> Option<usize> {
        match self {
            SampleMessage::CannotGenerateCode => None,
            SampleMessage::BuildFailed { sample, .. }
            | SampleMessage::RuntimeFault { sample, .. }
            | SampleMessage::UnexpectedFlow { sample, .. }
            | SampleMessage::OutputMismatch { sample, .. }
            | SampleMessage::NoOutput { sample } => Some(*sample),
        }
    }
}

impl fmt::Display for SampleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleMessage::CannotGenerateCode => f.write_str("cannot generate code"),
            SampleMessage::BuildFailed { sample, error } => {
                write!(f, "sample {sample}: build failed: {error}")
            }
            SampleMessage::RuntimeFault { sample, error } => {
                write!(f, "sample {sample}: runtime fault: {error}")
            }
            SampleMessage::UnexpectedFlow {
                sample,
                expected,
                actual,
            } => write!(f, "sample {sample}: unexpected output flow '{actual}' (expected '{expected}')"),
            SampleMessage::OutputMismatch {
                sample,
                expected,
                actual,
            } => {
                let expected = serde_json::to_string(expected).map_err(|_| fmt::Error)?;
                let actual = serde_json::to_string(actual).map_err(|_| fmt::Error)?;
                write!(f, "sample {sample}: output mismatch: {actual} vs {expected}")
            }
            SampleMessage::NoOutput { sample } => write!(f, "sample {sample}: no output flow was reached"),
        }
    }
}

/// Checks `ctx` against every sample of its environment.
pub fn verify_samples<S: TypeSystem>(ctx: &GraphContext<S>, on_message: &mut dyn FnMut(SampleMessage)) -> bool {
    if !ctx.can_generate_working_code() {
        on_message(SampleMessage::CannotGenerateCode);
        return false;
    }

    let mut result = true;
    for (index, sample) in ctx.env().samples.iter().enumerate() {
        for message in run_sample(ctx, index, sample) {
            debug!(sample = index, %message, "sample failed");
            result = false;
            on_message(message);
        }
    }
    result
}

fn run_sample<S: TypeSystem>(ctx: &GraphContext<S>, index: usize, sample: &Sample) -> Vec<SampleMessage> {
    let program = match compile(ctx, &sample.impls) {
        Ok(program) => program,
        Err(error) => {
            return vec![SampleMessage::BuildFailed {
                sample: index,
                error,
            }]
        }
    };

    let messages = RefCell::new(Vec::new());
    let reached = Cell::new(false);
    {
        let mut handlers: FlowHandlers = HashMap::new();
        for flow in ctx.graph().output_flows.keys() {
            let (messages, reached) = (&messages, &reached);
            let handler: Box<dyn FnMut(&ValueMap)> = if *flow == sample.output_flow {
                Box::new(move |actual: &ValueMap| {
                    reached.set(true);
                    if *actual != sample.output {
                        messages.borrow_mut().push(SampleMessage::OutputMismatch {
                            sample: index,
                            expected: sample.output.clone(),
                            actual: actual.clone(),
                        });
                    }
                })
            } else {
                let actual = flow.clone();
                Box::new(move |_: &ValueMap| {
                    reached.set(true);
                    messages.borrow_mut().push(SampleMessage::UnexpectedFlow {
                        sample: index,
                        expected: sample.output_flow.clone(),
                        actual: actual.clone(),
                    });
                })
            };
            handlers.insert(flow.clone(), handler);
        }

        if let Err(error) = program.invoke(&sample.input, &mut handlers) {
            messages.borrow_mut().push(SampleMessage::RuntimeFault {
                sample: index,
                error,
            });
        }
    }

    let mut messages = messages.into_inner();
    if !reached.get() && messages.is_empty() {
        messages.push(SampleMessage::NoOutput { sample: index });
    }
    messages
}
