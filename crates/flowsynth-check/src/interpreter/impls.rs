//! Proc implementations: what actually runs when control reaches a proc node.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use flowsynth_core::id::{FlowId, ProcId};

use super::error::RuntimeError;
use super::value::{Value, ValueMap};

/// The result of one proc invocation: which output flow to continue on and
/// the values of that flow's slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcOutcome {
    pub flow: FlowId,
    pub values: ValueMap,
}

impl ProcOutcome {
    pub fn new(flow: impl Into<FlowId>) -> Self {
        ProcOutcome {
            flow: flow.into(),
            values: ValueMap::new(),
        }
    }

    pub fn with(mut self, slot: &str, value: impl Into<Value>) -> Self {
        self.values.insert(slot.to_string(), value.into());
        self
    }
}

/// An executable implementation of a catalog proc.
pub trait ProcImpl: Send + Sync {
    /// Runs the proc on its arguments, keyed by input slot.
    fn invoke(&self, args: &ValueMap) -> Result<ProcOutcome, RuntimeError>;
}

/// Adapts a closure into a [`ProcImpl`].
pub struct FnImpl<F>(pub F);

impl<F> ProcImpl for FnImpl<F>
where
    F: Fn(&ValueMap) -> Result<ProcOutcome, RuntimeError> + Send + Sync,
{
    fn invoke(&self, args: &ValueMap) -> Result<ProcOutcome, RuntimeError> {
        (self.0)(args)
    }
}

/// Chosen implementation per proc id. Cheap to clone.
#[derive(Clone, Default)]
pub struct ImplTable {
    impls: HashMap<ProcId, Arc<dyn ProcImpl>>,
}

impl ImplTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, proc: impl Into<ProcId>, imp: Arc<dyn ProcImpl>) {
        self.impls.insert(proc.into(), imp);
    }

    /// Builder-style [`insert`](Self::insert) for closures.
    pub fn with_fn<F>(mut self, proc: &str, f: F) -> Self
    where
        F: Fn(&ValueMap) -> Result<ProcOutcome, RuntimeError> + Send + Sync + 'static,
    {
        self.insert(proc, Arc::new(FnImpl(f)));
        self
    }

    pub fn get(&self, proc: &ProcId) -> Option<&Arc<dyn ProcImpl>> {
        self.impls.get(proc)
    }

    pub fn len(&self) -> usize {
        self.impls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.impls.is_empty()
    }
}

impl fmt::Debug for ImplTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut procs: Vec<_> = self.impls.keys().collect();
        procs.sort();
        f.debug_struct("ImplTable").field("procs", &procs).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_impls() {
        let table = ImplTable::new().with_fn("double", |args| {
            let v = args.get("value").and_then(Value::as_int).unwrap_or(0);
            Ok(ProcOutcome::new("ok").with("value", v * 2))
        });
        let imp = table.get(&"double".into()).unwrap();
        let args: ValueMap = [("value".to_string(), Value::Int(21))].into_iter().collect();
        assert_eq!(imp.invoke(&args).unwrap(), ProcOutcome::new("ok").with("value", 42i64));
        assert!(table.get(&"missing".into()).is_none());
    }
}
