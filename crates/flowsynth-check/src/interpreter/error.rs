//! Error types for lowering and running programs.
//!
//! [`BridgeError`] means a graph could not be turned into a [`Program`]
//! (it still has errors, or an implementation is missing). [`RuntimeError`]
//! halts a run; it names the node that faulted where one is known.
//!
//! [`Program`]: super::Program

use serde::{Deserialize, Serialize};

use flowsynth_core::id::{FlowId, NodeId, ProcId};

/// Runtime faults. Each one halts execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum RuntimeError {
    #[error("missing graph input '{name}'")]
    MissingInput { name: String },

    #[error("missing value: node {node} slot '{slot}' has no value on this path")]
    MissingValue { node: NodeId, slot: String },

    #[error("missing value: graph output '{flow}.{slot}' has no value on this path")]
    MissingOutput { flow: FlowId, slot: String },

    #[error("node {node} produced no value for '{flow}.{slot}'")]
    IncompleteOutcome {
        node: NodeId,
        flow: FlowId,
        slot: String,
    },

    #[error("node {node} continued on undeclared flow '{flow}'")]
    UndeclaredFlow { node: NodeId, flow: FlowId },

    #[error("invalid argument '{slot}': expected {expected}, got {got}")]
    InvalidArgument {
        slot: String,
        expected: String,
        got: String,
    },

    #[error("proc at node {node} failed: {cause}")]
    ProcFailed {
        node: NodeId,
        #[source]
        cause: Box<RuntimeError>,
    },

    #[error("step limit ({limit}) exceeded")]
    StepLimitExceeded { limit: usize },

    #[error("no handler for output flow '{flow}'")]
    UnhandledFlow { flow: FlowId },

    #[error("{message}")]
    Fault { message: String },

    #[error("internal error: {message}")]
    InternalError { message: String },
}

/// Failures to lower a graph into a runnable program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("graph has {errors} error(s) and cannot be compiled")]
    NotWorking { errors: usize },

    #[error("no implementation for proc '{proc}'")]
    MissingImpl { proc: ProcId },

    #[error("proc not found: '{proc}'")]
    UnknownProc { proc: ProcId },

    #[error("unknown builtin '{name}'")]
    UnknownBuiltin { name: String },

    #[error("builtin '{name}' cannot implement proc '{proc}': {reason}")]
    IncompatibleBuiltin {
        name: String,
        proc: ProcId,
        reason: String,
    },

    #[error("{connector} is not connected")]
    Unwired { connector: String },
}
