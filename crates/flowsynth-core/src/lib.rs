pub mod connector;
pub mod edge;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod nominal;
pub mod proc_def;
pub mod types;

// Re-export commonly used types
pub use connector::{
    ControlSink, ControlSinkKey, ControlSource, ControlSourceKey, Owner, SymbolSink, SymbolSinkKey,
    SymbolSource, SymbolSourceKey,
};
pub use edge::{ControlFlow, DataFlow};
pub use error::CoreError;
pub use graph::{Graph, GraphInput, NodeTable};
pub use id::{FlowId, NodeId, ProcId};
pub use node::{Node, PhiNode, ProcNode};
pub use nominal::{NominalTypes, TypeName};
pub use proc_def::{InputSlot, OutputSlot, Proc, ProcCatalog};
pub use types::{PredicateTypes, TypeSystem};
