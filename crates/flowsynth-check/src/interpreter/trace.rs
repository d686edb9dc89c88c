//! Execution trace recording for the graph interpreter.
//!
//! When tracing is enabled via [`InterpreterConfig::trace_enabled`], the
//! interpreter records a [`TraceEntry`] for every proc invocation.
//!
//! [`InterpreterConfig::trace_enabled`]: super::InterpreterConfig::trace_enabled

use flowsynth_core::id::{FlowId, NodeId, ProcId};

use super::value::ValueMap;

/// One proc invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub node_id: NodeId,
    pub proc: ProcId,
    /// Arguments by input slot.
    pub inputs: ValueMap,
    /// The flow the proc continued on.
    pub flow: FlowId,
    /// Results by output slot.
    pub outputs: ValueMap,
}
