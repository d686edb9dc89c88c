//! Supply and demand of symbols across the control network.
//!
//! The market answers "which values exist at this control point?":
//!
//! - `supply(source)`: symbols available when control leaves `source`.
//! - `demand(sink)`: symbols available when control arrives at `sink`.
//!
//! Symbols enter at their producing control source (graph inputs at the
//! entry, proc outputs at the proc's flow) and propagate forward along every
//! edge of the [`ControlGraph`], including through nodes. Propagation is a
//! worklist fixed point, so a value produced several hops upstream or around
//! a loop is still visible downstream. Sets only grow during propagation,
//! so adding an edge never takes a symbol away from any control point.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use flowsynth_core::connector::{ControlSinkKey, ControlSourceKey, SymbolSourceKey};

use super::flow_graph::{ControlGraph, ControlPoint};
use super::symbols::SymbolInstance;

/// The computed supply/demand mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Market {
    supply: IndexMap<ControlSourceKey, IndexSet<SymbolSourceKey>>,
    demand: IndexMap<ControlSinkKey, IndexSet<SymbolSourceKey>>,
}

impl Market {
    /// Propagates every symbol to a fixed point over `control`.
    pub fn compute<T>(
        control: &ControlGraph,
        symbols: &IndexMap<SymbolSourceKey, SymbolInstance<T>>,
    ) -> Self {
        let graph = control.graph();
        let mut sets: Vec<IndexSet<SymbolSourceKey>> = vec![IndexSet::new(); graph.node_count()];

        for (key, symbol) in symbols {
            let origin = ControlPoint::Source(symbol.source.control_source().key());
            if let Some(ix) = control.index_of(&origin) {
                sets[ix.index()].insert(key.clone());
            }
        }

        let mut queue: VecDeque<_> = graph.node_indices().collect();
        while let Some(ix) = queue.pop_front() {
            if sets[ix.index()].is_empty() {
                continue;
            }
            let outgoing = sets[ix.index()].clone();
            for next in graph.neighbors(ix) {
                let target = &mut sets[next.index()];
                let before = target.len();
                target.extend(outgoing.iter().cloned());
                if target.len() > before {
                    queue.push_back(next);
                }
            }
        }

        let position = |k: &SymbolSourceKey| symbols.get_index_of(k).unwrap_or(usize::MAX);
        let mut market = Market::default();
        for ix in graph.node_indices() {
            let mut set = std::mem::take(&mut sets[ix.index()]);
            set.sort_by(|a, b| position(a).cmp(&position(b)));
            match &graph[ix] {
                ControlPoint::Source(key) => {
                    market.supply.insert(key.clone(), set);
                }
                ControlPoint::Sink(key) => {
                    market.demand.insert(key.clone(), set);
                }
            }
        }
        market
    }

    /// Symbols available when control leaves `source`, in symbol-table order.
    pub fn supply(&self, source: &ControlSourceKey) -> impl Iterator<Item = &SymbolSourceKey> {
        self.supply.get(source).into_iter().flatten()
    }

    /// Symbols available when control arrives at `sink`, in symbol-table order.
    pub fn demand(&self, sink: &ControlSinkKey) -> impl Iterator<Item = &SymbolSourceKey> {
        self.demand.get(sink).into_iter().flatten()
    }

    pub fn is_supplied(&self, source: &ControlSourceKey, symbol: &SymbolSourceKey) -> bool {
        self.supply.get(source).is_some_and(|set| set.contains(symbol))
    }

    pub fn is_demanded(&self, sink: &ControlSinkKey, symbol: &SymbolSourceKey) -> bool {
        self.demand.get(sink).is_some_and(|set| set.contains(symbol))
    }
}
