//! Control and data connectors.
//!
//! Connectors are the endpoints edges attach to. Control connectors say where
//! execution leaves ([`ControlSource`]) or arrives ([`ControlSink`]); symbol
//! connectors say where a typed value is produced ([`SymbolSource`]) or
//! consumed ([`SymbolSink`]).
//!
//! Connectors are plain values. Two connectors denote the same logical point
//! when their canonical keys ([`ControlSourceKey`] etc.) are equal. A raw
//! connector may embed a stale copy of its node (say, a different proc id for
//! the same node id) and still refer to the same point. Analysis normalizes by
//! key, never by structural equality of the whole value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{FlowId, NodeId};
use crate::node::{Node, PhiNode, ProcNode};

// ---------------------------------------------------------------------------
// Control connectors
// ---------------------------------------------------------------------------

/// A point from which control flow leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlSource {
    /// The implicit entry of the graph.
    Entry,
    /// The continuation after a merge point.
    Phi { node: PhiNode },
    /// One output flow of a proc node.
    Flow { node: ProcNode, flow: FlowId },
}

/// A point control flow arrives at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlSink {
    /// The control input of a node.
    Node { node: Node },
    /// A declared output flow of the graph.
    Exit { flow: FlowId },
}

/// Canonical identity of a [`ControlSource`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlSourceKey {
    Entry,
    Phi(NodeId),
    Flow(NodeId, FlowId),
}

/// Canonical identity of a [`ControlSink`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlSinkKey {
    Node(NodeId),
    Exit(FlowId),
}

/// Which part of the graph a connector belongs to: the graph boundary
/// (entry, exits, inputs, outputs) or a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Boundary,
    Node(NodeId),
}

impl ControlSource {
    pub fn flow(node: ProcNode, flow: impl Into<FlowId>) -> Self {
        ControlSource::Flow {
            node,
            flow: flow.into(),
        }
    }

    pub fn key(&self) -> ControlSourceKey {
        match self {
            ControlSource::Entry => ControlSourceKey::Entry,
            ControlSource::Phi { node } => ControlSourceKey::Phi(node.id),
            ControlSource::Flow { node, flow } => ControlSourceKey::Flow(node.id, flow.clone()),
        }
    }

    pub fn owner(&self) -> Owner {
        match self {
            ControlSource::Entry => Owner::Boundary,
            ControlSource::Phi { node } => Owner::Node(node.id),
            ControlSource::Flow { node, .. } => Owner::Node(node.id),
        }
    }

    /// The node this source belongs to, if any.
    pub fn node(&self) -> Option<Node> {
        match self {
            ControlSource::Entry => None,
            ControlSource::Phi { node } => Some(Node::Phi(node.clone())),
            ControlSource::Flow { node, .. } => Some(Node::Proc(node.clone())),
        }
    }
}

impl ControlSink {
    pub fn node(node: impl Into<Node>) -> Self {
        ControlSink::Node { node: node.into() }
    }

    pub fn exit(flow: impl Into<FlowId>) -> Self {
        ControlSink::Exit { flow: flow.into() }
    }

    pub fn key(&self) -> ControlSinkKey {
        match self {
            ControlSink::Node { node } => ControlSinkKey::Node(node.id()),
            ControlSink::Exit { flow } => ControlSinkKey::Exit(flow.clone()),
        }
    }

    pub fn owner(&self) -> Owner {
        match self {
            ControlSink::Node { node } => Owner::Node(node.id()),
            ControlSink::Exit { .. } => Owner::Boundary,
        }
    }

    /// Merge points accept any number of incoming edges.
    pub fn is_merge(&self) -> bool {
        matches!(self, ControlSink::Node { node } if node.is_phi())
    }
}

// ---------------------------------------------------------------------------
// Symbol connectors
// ---------------------------------------------------------------------------

/// A point where a typed value is produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SymbolSource {
    /// A graph input.
    Input { name: String },
    /// A named output slot of a proc node's output flow.
    Output {
        node: ProcNode,
        flow: FlowId,
        slot: String,
    },
}

/// A point where a typed value is required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SymbolSink {
    /// A named input slot of a proc node.
    Input { node: ProcNode, slot: String },
    /// A named slot of a graph output flow.
    Output { flow: FlowId, slot: String },
}

/// Canonical identity of a [`SymbolSource`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolSourceKey {
    Input(String),
    Output(NodeId, FlowId, String),
}

/// Canonical identity of a [`SymbolSink`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolSinkKey {
    Input(NodeId, String),
    Output(FlowId, String),
}

impl SymbolSource {
    pub fn input(name: &str) -> Self {
        SymbolSource::Input {
            name: name.to_string(),
        }
    }

    pub fn output(node: ProcNode, flow: impl Into<FlowId>, slot: &str) -> Self {
        SymbolSource::Output {
            node,
            flow: flow.into(),
            slot: slot.to_string(),
        }
    }

    pub fn key(&self) -> SymbolSourceKey {
        match self {
            SymbolSource::Input { name } => SymbolSourceKey::Input(name.clone()),
            SymbolSource::Output { node, flow, slot } => {
                SymbolSourceKey::Output(node.id, flow.clone(), slot.clone())
            }
        }
    }

    /// The control point at which this value comes into existence.
    pub fn control_source(&self) -> ControlSource {
        match self {
            SymbolSource::Input { .. } => ControlSource::Entry,
            SymbolSource::Output { node, flow, .. } => ControlSource::Flow {
                node: node.clone(),
                flow: flow.clone(),
            },
        }
    }
}

impl SymbolSink {
    pub fn input(node: ProcNode, slot: &str) -> Self {
        SymbolSink::Input {
            node,
            slot: slot.to_string(),
        }
    }

    pub fn output(flow: impl Into<FlowId>, slot: &str) -> Self {
        SymbolSink::Output {
            flow: flow.into(),
            slot: slot.to_string(),
        }
    }

    pub fn key(&self) -> SymbolSinkKey {
        match self {
            SymbolSink::Input { node, slot } => SymbolSinkKey::Input(node.id, slot.clone()),
            SymbolSink::Output { flow, slot } => SymbolSinkKey::Output(flow.clone(), slot.clone()),
        }
    }

    /// The control point at which this value is consumed.
    pub fn control_sink(&self) -> ControlSink {
        match self {
            SymbolSink::Input { node, .. } => ControlSink::Node {
                node: Node::Proc(node.clone()),
            },
            SymbolSink::Output { flow, .. } => ControlSink::Exit { flow: flow.clone() },
        }
    }

    /// The slot id, regardless of which side of the graph the sink is on.
    pub fn slot(&self) -> &str {
        match self {
            SymbolSink::Input { slot, .. } | SymbolSink::Output { slot, .. } => slot,
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for ControlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlSource::Entry => f.write_str("entry"),
            ControlSource::Phi { node } => write!(f, "{node} exit"),
            ControlSource::Flow { node, flow } => write!(f, "{node} flow '{flow}'"),
        }
    }
}

impl fmt::Display for ControlSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlSink::Node { node } => write!(f, "{node} input"),
            ControlSink::Exit { flow } => write!(f, "output flow '{flow}'"),
        }
    }
}

impl fmt::Display for SymbolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolSource::Input { name } => write!(f, "graph input '{name}'"),
            SymbolSource::Output { node, flow, slot } => write!(f, "{node} output '{flow}.{slot}'"),
        }
    }
}

impl fmt::Display for SymbolSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolSink::Input { node, slot } => write!(f, "{node} slot '{slot}'"),
            SymbolSink::Output { flow, slot } => write!(f, "graph output '{flow}.{slot}'"),
        }
    }
}
