//! Identifier newtypes for flow graph entities.
//!
//! Node ids are numeric and allocated by the graph. Proc and flow ids are
//! caller-chosen names: procs are looked up in a catalog by [`ProcId`], and
//! output flows (of a proc or of the graph itself) are named by [`FlowId`].
//! Slot names stay plain `String`s since they only ever key small maps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a node within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Identity of a proc in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcId(pub String);

/// Identity of an output flow (a possible continuation of a proc or graph).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowId(pub String);

impl ProcId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FlowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Display implementations print the inner value.

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProcId {
    fn from(s: &str) -> Self {
        ProcId(s.to_string())
    }
}

impl From<String> for ProcId {
    fn from(s: String) -> Self {
        ProcId(s)
    }
}

impl From<&str> for FlowId {
    fn from(s: &str) -> Self {
        FlowId(s.to_string())
    }
}

impl From<String> for FlowId {
    fn from(s: String) -> Self {
        FlowId(s)
    }
}
