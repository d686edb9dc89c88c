//! Symbol instances: typed, named values flowing through the data network.
//!
//! A [`SymbolInstance`] pairs a canonical symbol source with its resolved
//! type and the display names it has picked up. Names come from the graph
//! input's own name and from catalog naming hints. A proc output with
//! `name_sources` also takes the names of the symbols feeding those input
//! slots. Names
//! only guide scoring; they never affect correctness.

use std::collections::HashSet;

use indexmap::IndexMap;
use smallvec::SmallVec;

use flowsynth_core::connector::{SymbolSink, SymbolSinkKey, SymbolSource, SymbolSourceKey};
use flowsynth_core::edge::DataFlow;
use flowsynth_core::graph::Graph;
use flowsynth_core::proc_def::ProcCatalog;

use super::connectors::Connectors;

/// Candidate display names of a symbol.
pub type SymbolNames = SmallVec<[String; 4]>;

/// A materialized symbol source.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInstance<T> {
    pub source: SymbolSource,
    pub ty: T,
    pub names: SymbolNames,
}

/// Declared type of a symbol source: the graph input's type or the proc's
/// output slot type. `None` when the input, proc, flow or slot is unknown.
pub fn symbol_source_type<T: Clone>(
    graph: &Graph<T>,
    catalog: &ProcCatalog<T>,
    source: &SymbolSource,
) -> Option<T> {
    match source {
        SymbolSource::Input { name } => graph.inputs.get(name).map(|input| input.ty.clone()),
        SymbolSource::Output { node, flow, slot } => catalog
            .get(&node.proc)?
            .output_slot(flow, slot)
            .map(|s| s.ty.clone()),
    }
}

/// Declared type of a symbol sink: the proc's input slot type or the graph
/// output slot type.
pub fn symbol_sink_type<T: Clone>(
    graph: &Graph<T>,
    catalog: &ProcCatalog<T>,
    sink: &SymbolSink,
) -> Option<T> {
    match sink {
        SymbolSink::Input { node, slot } => catalog
            .get(&node.proc)?
            .input_slot(slot)
            .map(|s| s.ty.clone()),
        SymbolSink::Output { flow, slot } => graph.output_flows.get(flow)?.get(slot).cloned(),
    }
}

/// Names a sink is known under: the slot id plus the catalog's naming hints.
pub fn symbol_sink_known_names<T>(catalog: &ProcCatalog<T>, sink: &SymbolSink) -> Vec<String> {
    let mut names = vec![sink.slot().to_string()];
    if let SymbolSink::Input { node, slot } = sink {
        if let Some(input) = catalog.get(&node.proc).and_then(|p| p.input_slot(slot)) {
            for name in &input.names {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
    }
    names
}

/// Builds the symbol table: one instance per canonical symbol source whose
/// type resolves. Sources with unresolvable types are left out.
pub fn build_symbols<T: Clone>(
    graph: &Graph<T>,
    catalog: &ProcCatalog<T>,
    connectors: &Connectors,
    data_flow: &[DataFlow],
) -> IndexMap<SymbolSourceKey, SymbolInstance<T>> {
    let feeds: IndexMap<SymbolSinkKey, &SymbolSource> = data_flow
        .iter()
        .map(|edge| (edge.target.key(), &edge.source))
        .collect();
    let namer = Namer {
        graph,
        catalog,
        feeds: &feeds,
    };

    connectors
        .symbol_sources
        .iter()
        .filter_map(|(key, source)| {
            let ty = symbol_source_type(graph, catalog, source)?;
            let names = namer.names(source, &mut HashSet::new());
            Some((
                key.clone(),
                SymbolInstance {
                    source: source.clone(),
                    ty,
                    names,
                },
            ))
        })
        .collect()
}

struct Namer<'a, T> {
    graph: &'a Graph<T>,
    catalog: &'a ProcCatalog<T>,
    /// Which source feeds each sink (last edge wins when several do).
    feeds: &'a IndexMap<SymbolSinkKey, &'a SymbolSource>,
}

impl<T> Namer<'_, T> {
    fn names(&self, source: &SymbolSource, visiting: &mut HashSet<SymbolSourceKey>) -> SymbolNames {
        let mut names = SymbolNames::new();
        if !visiting.insert(source.key()) {
            return names;
        }

        match source {
            SymbolSource::Input { name } => {
                push_unique(&mut names, name);
                if let Some(input) = self.graph.inputs.get(name) {
                    for alias in &input.names {
                        push_unique(&mut names, alias);
                    }
                }
            }
            SymbolSource::Output { node, flow, slot } => {
                let Some(out) = self
                    .catalog
                    .get(&node.proc)
                    .and_then(|p| p.output_slot(flow, slot))
                else {
                    return names;
                };
                for name in &out.names {
                    push_unique(&mut names, name);
                }
                for input_slot in &out.name_sources {
                    let key = SymbolSinkKey::Input(node.id, input_slot.clone());
                    if let Some(upstream) = self.feeds.get(&key) {
                        for name in self.names(upstream, visiting) {
                            push_unique(&mut names, &name);
                        }
                    }
                }
            }
        }
        names
    }
}

fn push_unique(names: &mut SymbolNames, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
