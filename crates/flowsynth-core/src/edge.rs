//! Edge types for both flow networks.
//!
//! [`ControlFlow`] edges order execution: control leaves a source and arrives
//! at a sink. [`DataFlow`] edges plumb a produced value into a slot that
//! requires it. The two networks are kept separate and traversed
//! independently; analysis relates them through the control points that own
//! each symbol connector.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::connector::{
    ControlSink, ControlSinkKey, ControlSource, ControlSourceKey, SymbolSink, SymbolSinkKey,
    SymbolSource, SymbolSourceKey,
};

/// A control-flow edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlFlow {
    pub source: ControlSource,
    pub target: ControlSink,
}

/// A data-flow edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataFlow {
    pub source: SymbolSource,
    pub target: SymbolSink,
}

impl ControlFlow {
    pub fn new(source: ControlSource, target: ControlSink) -> Self {
        ControlFlow { source, target }
    }

    pub fn key(&self) -> (ControlSourceKey, ControlSinkKey) {
        (self.source.key(), self.target.key())
    }
}

impl DataFlow {
    pub fn new(source: SymbolSource, target: SymbolSink) -> Self {
        DataFlow { source, target }
    }

    pub fn key(&self) -> (SymbolSourceKey, SymbolSinkKey) {
        (self.source.key(), self.target.key())
    }
}

impl fmt::Display for ControlFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

impl fmt::Display for DataFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::node::ProcNode;

    #[test]
    fn control_edge_display() {
        let edge = ControlFlow::new(ControlSource::Entry, ControlSink::exit("done"));
        assert_eq!(edge.to_string(), "entry -> output flow 'done'");
    }

    #[test]
    fn data_edge_key_uses_connector_keys() {
        let node = ProcNode::new(NodeId(1), "inc");
        let edge = DataFlow::new(SymbolSource::input("x"), SymbolSink::input(node, "value"));
        assert_eq!(
            edge.key(),
            (
                SymbolSourceKey::Input("x".into()),
                SymbolSinkKey::Input(NodeId(1), "value".into())
            )
        );
    }

    #[test]
    fn serde_roundtrip_control_edge() {
        let node = ProcNode::new(NodeId(2), "parse");
        let edge = ControlFlow::new(ControlSource::flow(node, "err"), ControlSink::exit("fail"));
        let json = serde_json::to_string(&edge).unwrap();
        let back: ControlFlow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, edge);
    }
}
