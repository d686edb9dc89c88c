//! Proc metadata and the proc catalog.
//!
//! A [`Proc`] describes a reusable operation: its typed input slots and one
//! or more output flows, each flow carrying its own typed output slots. A
//! proc with several flows models an operation with several continuations
//! (e.g. `ok` / `err`). Procs are never created by the engine; graph nodes
//! refer to them by [`ProcId`] through a [`ProcCatalog`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::{FlowId, ProcId};

/// Short list of candidate display names for a slot.
pub type Names = SmallVec<[String; 2]>;

/// A typed input slot of a proc (a data sink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSlot<T> {
    /// Names under which this input is commonly known (naming hints only).
    #[serde(default)]
    pub names: Names,
    #[serde(rename = "type")]
    pub ty: T,
}

/// A typed output slot of one proc output flow (a data source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSlot<T> {
    #[serde(default)]
    pub names: Names,
    /// Input slot ids whose incoming symbol names carry over to this output.
    #[serde(default)]
    pub name_sources: SmallVec<[String; 1]>,
    #[serde(rename = "type")]
    pub ty: T,
}

/// Output slots of one flow, keyed by slot id.
pub type FlowSlots<T> = IndexMap<String, OutputSlot<T>>;

/// A catalog-registered operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Proc<T> {
    /// Side-effect free?
    #[serde(default)]
    pub pure: bool,
    #[serde(default)]
    pub inputs: IndexMap<String, InputSlot<T>>,
    #[serde(default)]
    pub output_flows: IndexMap<FlowId, FlowSlots<T>>,
}

impl<T> Proc<T> {
    /// Creates a proc with no slots and no flows.
    pub fn new(pure: bool) -> Self {
        Proc {
            pure,
            inputs: IndexMap::new(),
            output_flows: IndexMap::new(),
        }
    }

    /// Adds an input slot, known by its own id.
    pub fn input(self, slot: &str, ty: T) -> Self {
        self.input_named(slot, ty, &[slot])
    }

    /// Adds an input slot with explicit naming hints.
    pub fn input_named(mut self, slot: &str, ty: T, names: &[&str]) -> Self {
        self.inputs.insert(
            slot.to_string(),
            InputSlot {
                names: names.iter().map(|n| n.to_string()).collect(),
                ty,
            },
        );
        self
    }

    /// Declares an output flow without slots (e.g. a bare failure path).
    pub fn flow(mut self, flow: &str) -> Self {
        self.output_flows.entry(FlowId::from(flow)).or_default();
        self
    }

    /// Adds an output slot to `flow`, declaring the flow if needed.
    pub fn output(self, flow: &str, slot: &str, ty: T) -> Self {
        self.output_named(flow, slot, ty, &[slot], &[])
    }

    /// Adds an output slot with naming hints and name sources.
    pub fn output_named(
        mut self,
        flow: &str,
        slot: &str,
        ty: T,
        names: &[&str],
        name_sources: &[&str],
    ) -> Self {
        self.output_flows.entry(FlowId::from(flow)).or_default().insert(
            slot.to_string(),
            OutputSlot {
                names: names.iter().map(|n| n.to_string()).collect(),
                name_sources: name_sources.iter().map(|n| n.to_string()).collect(),
                ty,
            },
        );
        self
    }

    pub fn input_slot(&self, slot: &str) -> Option<&InputSlot<T>> {
        self.inputs.get(slot)
    }

    pub fn flow_slots(&self, flow: &FlowId) -> Option<&FlowSlots<T>> {
        self.output_flows.get(flow)
    }

    pub fn output_slot(&self, flow: &FlowId, slot: &str) -> Option<&OutputSlot<T>> {
        self.output_flows.get(flow).and_then(|slots| slots.get(slot))
    }
}

/// Immutable lookup table from [`ProcId`] to [`Proc`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcCatalog<T> {
    procs: IndexMap<ProcId, Proc<T>>,
}

impl<T> Default for ProcCatalog<T> {
    fn default() -> Self {
        ProcCatalog {
            procs: IndexMap::new(),
        }
    }
}

impl<T> ProcCatalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration; a later registration replaces an earlier one.
    pub fn with(mut self, id: &str, proc: Proc<T>) -> Self {
        self.procs.insert(ProcId::from(id), proc);
        self
    }

    pub fn get(&self, id: &ProcId) -> Option<&Proc<T>> {
        self.procs.get(id)
    }

    pub fn contains(&self, id: &ProcId) -> bool {
        self.procs.contains_key(id)
    }

    /// Procs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProcId, &Proc<T>)> {
        self.procs.iter()
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }
}

impl<T> FromIterator<(ProcId, Proc<T>)> for ProcCatalog<T> {
    fn from_iter<I: IntoIterator<Item = (ProcId, Proc<T>)>>(iter: I) -> Self {
        ProcCatalog {
            procs: iter.into_iter().collect(),
        }
    }
}
