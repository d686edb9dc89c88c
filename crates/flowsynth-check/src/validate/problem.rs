//! Graph problems with severity, fixability and the offending component.
//!
//! [`ProblemKind`] captures full context for every problem the validator can
//! report. Severity and whether synthesis could fix it follow from the kind
//! alone, in three classes:
//!
//! - Structural/reference problems (unknown proc, conflicting node, arity,
//!   dangling edge): errors that need a human.
//! - Wiring problems (type mismatch, unavailable symbol, duplicate or missing
//!   connection): errors synthesis is expected to fix.
//! - Reachability (unreached sink): warnings; the graph still runs.

use serde::{Deserialize, Serialize};

use flowsynth_core::connector::{ControlSink, ControlSource, SymbolSink, SymbolSource};
use flowsynth_core::edge::{ControlFlow, DataFlow};
use flowsynth_core::id::{FlowId, NodeId, ProcId};
use flowsynth_core::node::Node;

/// How bad a problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The graph would not yield a working program.
    Error,
    /// The graph yields a program, but likely not the intended one.
    Warning,
}

/// What exactly is wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemKind {
    #[error("node {node} references unknown proc '{proc}'")]
    UnknownProc { node: NodeId, proc: ProcId },

    #[error("node {node} is mentioned as both {first} and {second}")]
    ConflictingNode { node: NodeId, first: String, second: String },

    #[error("node {node} uses output flow '{flow}' which proc '{proc}' does not declare")]
    UnknownFlow { node: NodeId, proc: ProcId, flow: FlowId },

    #[error("node {node} uses slot '{slot}' which proc '{proc}' does not declare")]
    UnknownSlot { node: NodeId, proc: ProcId, slot: String },

    #[error("control edge has a dangling endpoint: {edge}")]
    DanglingControlEdge { edge: String },

    #[error("data edge has a dangling endpoint: {edge}")]
    DanglingDataEdge { edge: String },

    #[error("{sink} has {count} incoming control edges")]
    DuplicateControlSink { sink: String, count: usize },

    #[error("{connector} has {count} outgoing control edges")]
    DuplicateControlSource { connector: String, count: usize },

    #[error("control flow leaving {connector} is not connected")]
    UnconnectedControlSource { connector: String },

    #[error("{sink} is not reachable from the entry")]
    UnreachedControlSink { sink: String },

    #[error("type mismatch: {symbol} of type {actual} feeds {sink} expecting {expected}")]
    TypeMismatch {
        symbol: String,
        sink: String,
        expected: String,
        actual: String,
    },

    #[error("{sink} has no incoming data edge")]
    UnconnectedSymbolSink { sink: String },

    #[error("{sink} has {count} incoming data edges")]
    DuplicateSymbolSink { sink: String, count: usize },

    #[error("{symbol} is not available at {sink}")]
    UnavailableSymbol { symbol: String, sink: String },
}

impl ProblemKind {
    pub fn severity(&self) -> Severity {
        match self {
            ProblemKind::UnreachedControlSink { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// `true` when synthesis cannot be expected to resolve this problem.
    pub fn needs_human_intervention(&self) -> bool {
        matches!(
            self,
            ProblemKind::UnknownProc { .. }
                | ProblemKind::ConflictingNode { .. }
                | ProblemKind::UnknownFlow { .. }
                | ProblemKind::UnknownSlot { .. }
                | ProblemKind::DanglingControlEdge { .. }
                | ProblemKind::DanglingDataEdge { .. }
        )
    }
}

/// The part of the graph a problem is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", rename_all = "snake_case")]
pub enum GraphComponent {
    Node(Node),
    ControlSource(ControlSource),
    ControlSink(ControlSink),
    SymbolSource(SymbolSource),
    SymbolSink(SymbolSink),
    ControlEdge(ControlFlow),
    DataEdge(DataFlow),
}

/// A validation finding, as consumed by callers and diagnostics UIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphProblem {
    pub severity: Severity,
    pub needs_human_intervention: bool,
    pub message: String,
    pub kind: ProblemKind,
    pub graph_component: GraphComponent,
}

impl GraphProblem {
    pub fn new(kind: ProblemKind, graph_component: GraphComponent) -> Self {
        GraphProblem {
            severity: kind.severity(),
            needs_human_intervention: kind.needs_human_intervention(),
            message: kind.to_string(),
            kind,
            graph_component,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for GraphProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity}: {}", self.message)
    }
}
