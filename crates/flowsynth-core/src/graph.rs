//! Graph: the caller-owned, serializable description of a flow program.
//!
//! A [`Graph`] holds the graph's typed inputs, its declared output flows and
//! the raw control/data edge lists. It is a value: every edit returns a new
//! graph and leaves the receiver untouched.
//!
//! # Nodes
//!
//! Nodes are not declared separately. Each edge endpoint embeds its node, and
//! [`Graph::nodes`] collects them in first-mention order. When two mentions of
//! one [`NodeId`] disagree (phi vs proc, or two different procs), the first
//! mention wins and the disagreement is reported in
//! [`NodeTable::conflicts`] for validation to flag.
//!
//! # Raw edges
//!
//! Edges are stored exactly as given. Whether an endpoint actually exists
//! (known proc, declared flow, declared slot) is a question for analysis, not
//! for this type. A graph may well reference things the catalog lacks.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::connector::{ControlSink, ControlSource, SymbolSink, SymbolSource};
use crate::edge::{ControlFlow, DataFlow};
use crate::error::CoreError;
use crate::id::{FlowId, NodeId};
use crate::node::Node;
use crate::proc_def::Names;

/// A typed graph input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphInput<T> {
    #[serde(rename = "type")]
    pub ty: T,
    /// Extra display names beyond the input's own name.
    #[serde(default, skip_serializing_if = "Names::is_empty")]
    pub names: Names,
}

/// Declared slots of one graph output flow.
pub type OutputSlots<T> = IndexMap<String, T>;

/// The flow graph value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Graph<T> {
    #[serde(default)]
    pub inputs: IndexMap<String, GraphInput<T>>,
    #[serde(default)]
    pub output_flows: IndexMap<FlowId, OutputSlots<T>>,
    #[serde(default)]
    pub control_flow: Vec<ControlFlow>,
    #[serde(default)]
    pub data_flow: Vec<DataFlow>,
}

/// Nodes mentioned by a graph's edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeTable {
    /// Canonical node per id, in first-mention order.
    pub nodes: IndexMap<NodeId, Node>,
    /// `(canonical, disagreeing mention)` pairs.
    pub conflicts: Vec<(Node, Node)>,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Graph {
            inputs: IndexMap::new(),
            output_flows: IndexMap::new(),
            control_flow: Vec::new(),
            data_flow: Vec::new(),
        }
    }
}

impl<T> Graph<T> {
    /// Creates an empty graph with no inputs, outputs or edges.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Declarations (builder style)
    // -----------------------------------------------------------------------

    /// Declares a graph input.
    pub fn input(mut self, name: &str, ty: T) -> Self {
        self.inputs.insert(
            name.to_string(),
            GraphInput {
                ty,
                names: Names::new(),
            },
        );
        self
    }

    /// Declares an output flow with no slots.
    pub fn output_flow(mut self, flow: &str) -> Self {
        self.output_flows.entry(FlowId::from(flow)).or_default();
        self
    }

    /// Declares a slot on an output flow, declaring the flow if needed.
    pub fn output_slot(mut self, flow: &str, slot: &str, ty: T) -> Self {
        self.output_flows
            .entry(FlowId::from(flow))
            .or_default()
            .insert(slot.to_string(), ty);
        self
    }

    // -----------------------------------------------------------------------
    // Node discovery
    // -----------------------------------------------------------------------

    /// Every node mention across both edge lists, in edge order.
    pub fn node_mentions(&self) -> impl Iterator<Item = Node> + '_ {
        let control = self.control_flow.iter().flat_map(|edge| {
            let source = edge.source.node();
            let target = match &edge.target {
                ControlSink::Node { node } => Some(node.clone()),
                ControlSink::Exit { .. } => None,
            };
            source.into_iter().chain(target)
        });
        let data = self.data_flow.iter().flat_map(|edge| {
            let source = match &edge.source {
                SymbolSource::Output { node, .. } => Some(Node::Proc(node.clone())),
                SymbolSource::Input { .. } => None,
            };
            let target = match &edge.target {
                SymbolSink::Input { node, .. } => Some(Node::Proc(node.clone())),
                SymbolSink::Output { .. } => None,
            };
            source.into_iter().chain(target)
        });
        control.chain(data)
    }

    /// Collects the graph's nodes, recording disagreeing mentions.
    pub fn nodes(&self) -> NodeTable {
        let mut table = NodeTable::default();
        for mention in self.node_mentions() {
            match table.nodes.get(&mention.id()) {
                None => {
                    table.nodes.insert(mention.id(), mention);
                }
                Some(existing) if *existing != mention => {
                    let pair = (existing.clone(), mention);
                    if !table.conflicts.contains(&pair) {
                        table.conflicts.push(pair);
                    }
                }
                Some(_) => {}
            }
        }
        table
    }

    /// A node id above every id mentioned in the graph, or `None` once the
    /// id space is used up.
    pub fn next_node_id(&self) -> Option<NodeId> {
        match self.node_mentions().map(|node| node.id().0).max() {
            None => Some(NodeId(0)),
            Some(max) => max.checked_add(1).map(NodeId),
        }
    }
}

impl<T: Clone> Graph<T> {
    // -----------------------------------------------------------------------
    // Edits (return new values)
    // -----------------------------------------------------------------------

    /// A copy of this graph with one more raw control edge.
    pub fn with_control_edge(&self, source: ControlSource, target: ControlSink) -> Self {
        let mut next = self.clone();
        next.control_flow.push(ControlFlow::new(source, target));
        next
    }

    /// A copy of this graph with one more raw data edge.
    pub fn with_data_edge(&self, source: SymbolSource, target: SymbolSink) -> Self {
        let mut next = self.clone();
        next.data_flow.push(DataFlow::new(source, target));
        next
    }

    /// A copy of this graph keeping only the raw control edges `keep` accepts.
    pub fn retain_control_edges(&self, mut keep: impl FnMut(&ControlFlow) -> bool) -> Self {
        let mut next = self.clone();
        next.control_flow.retain(|edge| keep(edge));
        next
    }
}

impl<T> Graph<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    /// Parses a graph from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the graph as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
