//! Graph vertices.
//!
//! A node is either a [`PhiNode`] (a pure merge point for several control
//! paths) or a [`ProcNode`] (an invocation of a catalog proc). Proc nodes
//! carry only the proc id; metadata is always looked up in the catalog so
//! that catalog changes are picked up on the next analysis.
//!
//! Nodes have no storage of their own: connectors embed them by value and a
//! node exists as long as some edge mentions it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{NodeId, ProcId};

/// A control-flow merge point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhiNode {
    pub id: NodeId,
}

/// An invocation of a catalog proc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcNode {
    pub id: NodeId,
    pub proc: ProcId,
}

impl ProcNode {
    pub fn new(id: NodeId, proc: impl Into<ProcId>) -> Self {
        ProcNode {
            id,
            proc: proc.into(),
        }
    }
}

/// A vertex of the flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Phi(PhiNode),
    Proc(ProcNode),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Phi(phi) => phi.id,
            Node::Proc(proc) => proc.id,
        }
    }

    /// The referenced proc, for proc nodes.
    pub fn proc_id(&self) -> Option<&ProcId> {
        match self {
            Node::Phi(_) => None,
            Node::Proc(proc) => Some(&proc.proc),
        }
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, Node::Phi(_))
    }
}

impl From<PhiNode> for Node {
    fn from(node: PhiNode) -> Self {
        Node::Phi(node)
    }
}

impl From<ProcNode> for Node {
    fn from(node: ProcNode) -> Self {
        Node::Proc(node)
    }
}

impl fmt::Display for PhiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phi #{}", self.id)
    }
}

impl fmt::Display for ProcNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.id, self.proc)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Phi(phi) => phi.fmt(f),
            Node::Proc(proc) => proc.fmt(f),
        }
    }
}
