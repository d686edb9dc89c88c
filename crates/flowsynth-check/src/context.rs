//! The graph context: one graph snapshot plus everything derived from it.
//!
//! A [`GraphContext`] is built once from a [`Graph`] and a shared
//! [`Environment`] (type system, catalog, samples, tuning). Construction runs
//! analysis and validation eagerly; the score is computed on first use and
//! cached. Contexts are never updated in place: the mutation operations
//! return a fresh context for the edited graph and leave the receiver as it
//! was.

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use flowsynth_core::connector::{ControlSink, ControlSource, SymbolSink, SymbolSource};
use flowsynth_core::edge::{ControlFlow, DataFlow};
use flowsynth_core::graph::Graph;
use flowsynth_core::id::NodeId;
use flowsynth_core::node::Node;
use flowsynth_core::proc_def::{FlowSlots, InputSlot, OutputSlot, Proc, ProcCatalog};
use flowsynth_core::types::TypeSystem;

use crate::analysis::{self, traversal, Analysis, Connectors, SymbolInstance};
use crate::interpreter::{compile, BridgeError, ImplTable, InterpreterConfig, Program};
use crate::sample::{verify_samples, Sample, SampleMessage};
use crate::score::{name_proximity, ScoreWeights, Tally};
use crate::validate::{validate_graph, GraphProblem};

/// Everything a context needs besides the graph itself. Shared by every
/// context derived during one search.
pub struct Environment<S: TypeSystem> {
    pub types: S,
    pub catalog: ProcCatalog<S::Type>,
    pub samples: Vec<Sample>,
    pub weights: ScoreWeights,
    pub interpreter: InterpreterConfig,
}

impl<S: TypeSystem> Environment<S> {
    pub fn new(types: S, catalog: ProcCatalog<S::Type>) -> Self {
        Environment {
            types,
            catalog,
            samples: Vec::new(),
            weights: ScoreWeights::default(),
            interpreter: InterpreterConfig::default(),
        }
    }

    pub fn with_samples(mut self, samples: Vec<Sample>) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_interpreter(mut self, config: InterpreterConfig) -> Self {
        self.interpreter = config;
        self
    }
}

/// Canonical connectors no resolved edge touches.
#[derive(Debug, Clone, Default)]
struct Unconnected {
    control_sources: Vec<ControlSource>,
    control_sinks: Vec<ControlSink>,
    symbol_sources: Vec<SymbolSource>,
    symbol_sinks: Vec<SymbolSink>,
}

impl Unconnected {
    fn collect(connectors: &Connectors, control_flow: &[ControlFlow], data_flow: &[DataFlow]) -> Self {
        Unconnected {
            control_sources: connectors
                .control_sources
                .iter()
                .filter(|(key, _)| !control_flow.iter().any(|e| e.source.key() == **key))
                .map(|(_, x)| x.clone())
                .collect(),
            control_sinks: connectors
                .control_sinks
                .iter()
                .filter(|(key, _)| !control_flow.iter().any(|e| e.target.key() == **key))
                .map(|(_, x)| x.clone())
                .collect(),
            symbol_sources: connectors
                .symbol_sources
                .iter()
                .filter(|(key, _)| !data_flow.iter().any(|e| e.source.key() == **key))
                .map(|(_, x)| x.clone())
                .collect(),
            symbol_sinks: connectors
                .symbol_sinks
                .iter()
                .filter(|(key, _)| !data_flow.iter().any(|e| e.target.key() == **key))
                .map(|(_, x)| x.clone())
                .collect(),
        }
    }
}

/// A graph snapshot with its analysis, problems and (lazily) score.
pub struct GraphContext<S: TypeSystem> {
    graph: Graph<S::Type>,
    env: Arc<Environment<S>>,
    analysis: Analysis<S::Type>,
    problems: Vec<GraphProblem>,
    unconnected: Unconnected,
    score: OnceLock<f64>,
}

impl<S: TypeSystem> Clone for GraphContext<S> {
    fn clone(&self) -> Self {
        GraphContext {
            graph: self.graph.clone(),
            env: Arc::clone(&self.env),
            analysis: self.analysis.clone(),
            problems: self.problems.clone(),
            unconnected: self.unconnected.clone(),
            score: self.score.clone(),
        }
    }
}

impl<S: TypeSystem> fmt::Debug for GraphContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphContext")
            .field("graph", &self.graph)
            .field("problems", &self.problems)
            .field("score", &self.score.get())
            .finish_non_exhaustive()
    }
}

impl<S: TypeSystem> GraphContext<S> {
    pub fn new(graph: Graph<S::Type>, env: Arc<Environment<S>>) -> Self {
        let analysis = Analysis::run(&graph, &env.catalog);
        let problems = validate_graph(&graph, &env.catalog, &env.types, &analysis);
        let unconnected = Unconnected::collect(&analysis.connectors, &analysis.control_flow, &analysis.data_flow);
        GraphContext {
            graph,
            env,
            analysis,
            problems,
            unconnected,
            score: OnceLock::new(),
        }
    }

    /// A context for `graph` sharing this context's environment.
    fn derive(&self, graph: Graph<S::Type>) -> Self {
        GraphContext::new(graph, Arc::clone(&self.env))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn graph(&self) -> &Graph<S::Type> {
        &self.graph
    }

    pub fn env(&self) -> &Arc<Environment<S>> {
        &self.env
    }

    pub fn catalog(&self) -> &ProcCatalog<S::Type> {
        &self.env.catalog
    }

    pub fn types(&self) -> &S {
        &self.env.types
    }

    pub fn analysis(&self) -> &Analysis<S::Type> {
        &self.analysis
    }

    pub fn connectors(&self) -> &Connectors {
        &self.analysis.connectors
    }

    /// Resolved control edges.
    pub fn control_flow(&self) -> &[ControlFlow] {
        &self.analysis.control_flow
    }

    /// Resolved data edges.
    pub fn data_flow(&self) -> &[DataFlow] {
        &self.analysis.data_flow
    }

    pub fn problems(&self) -> &[GraphProblem] {
        &self.problems
    }

    pub fn nodes(&self) -> &IndexMap<NodeId, Node> {
        &self.analysis.nodes.nodes
    }

    pub fn node_count(&self) -> usize {
        self.analysis.nodes.nodes.len()
    }

    pub fn symbol(&self, source: &SymbolSource) -> Option<&SymbolInstance<S::Type>> {
        self.analysis.symbols.get(&source.key())
    }

    pub fn unconnected_control_sources(&self) -> &[ControlSource] {
        &self.unconnected.control_sources
    }

    pub fn unconnected_control_sinks(&self) -> &[ControlSink] {
        &self.unconnected.control_sinks
    }

    pub fn unconnected_symbol_sources(&self) -> &[SymbolSource] {
        &self.unconnected.symbol_sources
    }

    pub fn unconnected_symbol_sinks(&self) -> &[SymbolSink] {
        &self.unconnected.symbol_sinks
    }

    // -----------------------------------------------------------------------
    // Verdicts
    // -----------------------------------------------------------------------

    /// No problem is an error.
    pub fn can_generate_working_code(&self) -> bool {
        !self.problems.iter().any(GraphProblem::is_error)
    }

    /// No problem needs a human to fix it.
    pub fn can_be_fixed_with_synthesis(&self) -> bool {
        !self.problems.iter().any(|p| p.needs_human_intervention)
    }

    /// How close the graph is to a verified program, in `[0, 1]`. Exactly 1
    /// only for working graphs that pass every sample.
    pub fn score(&self) -> f64 {
        *self.score.get_or_init(|| self.compute_score())
    }

    fn compute_score(&self) -> f64 {
        if !self.can_be_fixed_with_synthesis() {
            return 0.0;
        }
        if self.can_generate_working_code() {
            return if self.matches_samples() { 1.0 } else { 0.0 };
        }

        let proximity = self
            .analysis
            .data_flow
            .iter()
            .map(|edge| {
                let known = analysis::symbol_sink_known_names(self.catalog(), &edge.target);
                self.symbol(&edge.source)
                    .map_or(0, |symbol| name_proximity(&known, &symbol.names))
            })
            .sum();

        self.env.weights.heuristic(&Tally {
            unconnected_control_sources: self.unconnected.control_sources.len(),
            unconnected_control_sinks: self.unconnected.control_sinks.len(),
            unconnected_symbol_sources: self.unconnected.symbol_sources.len(),
            unconnected_symbol_sinks: self.unconnected.symbol_sinks.len(),
            name_proximity: proximity,
            problems: self.problems.len(),
        })
    }

    /// Runs every sample; see [`matches_samples_with`](Self::matches_samples_with).
    pub fn matches_samples(&self) -> bool {
        self.matches_samples_with(|_| {})
    }

    /// Runs every sample, reporting each failure to `on_message`.
    pub fn matches_samples_with(&self, mut on_message: impl FnMut(SampleMessage)) -> bool {
        verify_samples(self, &mut on_message)
    }

    /// Lowers the graph for execution with `impls`.
    pub fn compile(&self, impls: &ImplTable) -> Result<Program, BridgeError> {
        compile(self, impls)
    }

    // -----------------------------------------------------------------------
    // Market and types
    // -----------------------------------------------------------------------

    /// Symbols available when control leaves `source`.
    pub fn get_supply(&self, source: &ControlSource) -> Vec<&SymbolInstance<S::Type>> {
        self.analysis
            .market
            .supply(&source.key())
            .filter_map(|key| self.analysis.symbols.get(key))
            .collect()
    }

    /// Symbols available when control arrives at `sink`.
    pub fn get_demand(&self, sink: &ControlSink) -> Vec<&SymbolInstance<S::Type>> {
        self.analysis
            .market
            .demand(&sink.key())
            .filter_map(|key| self.analysis.symbols.get(key))
            .collect()
    }

    pub fn symbol_source_type(&self, source: &SymbolSource) -> Option<S::Type> {
        analysis::symbol_source_type(&self.graph, self.catalog(), source)
    }

    pub fn symbol_sink_type(&self, sink: &SymbolSink) -> Option<S::Type> {
        analysis::symbol_sink_type(&self.graph, self.catalog(), sink)
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    pub fn node_source_to_sinks(&self, x: &ControlSource) -> Vec<&ControlSink> {
        traversal::node_source_to_sinks(x, self.connectors())
    }

    pub fn node_source_to_sources(&self, x: &ControlSource) -> Vec<&ControlSource> {
        traversal::node_source_to_sources(x, self.connectors())
    }

    pub fn node_sink_to_sinks(&self, x: &ControlSink) -> Vec<&ControlSink> {
        traversal::node_sink_to_sinks(x, self.connectors())
    }

    pub fn node_sink_to_sources(&self, x: &ControlSink) -> Vec<&ControlSource> {
        traversal::node_sink_to_sources(x, self.connectors())
    }

    pub fn edge_sink_to_source(&self, x: &ControlSink) -> Option<&ControlSource> {
        traversal::edge_sink_to_source(x, self.control_flow())
    }

    pub fn edge_source_to_sink(&self, x: &ControlSource) -> Option<&ControlSink> {
        traversal::edge_source_to_sink(x, self.control_flow())
    }

    pub fn edge_symbol_sink_to_source(&self, x: &SymbolSink) -> Option<&SymbolSource> {
        traversal::edge_symbol_sink_to_source(x, self.data_flow())
    }

    pub fn edge_symbol_source_to_sink(&self, x: &SymbolSource) -> Option<&SymbolSink> {
        traversal::edge_symbol_source_to_sink(x, self.data_flow())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Drops every raw control edge that normalizes to `edge`.
    pub fn remove_control_flow(&self, edge: &ControlFlow) -> Self {
        let key = edge.key();
        let connectors = self.connectors();
        let graph = self.graph.retain_control_edges(|raw| {
            connectors
                .control_edge(raw)
                .is_none_or(|resolved| resolved.key() != key)
        });
        self.derive(graph)
    }

    pub fn connect_control_flow(&self, source: ControlSource, sink: ControlSink) -> Self {
        self.derive(self.graph.with_control_edge(source, sink))
    }

    pub fn connect_data_flow(&self, source: SymbolSource, sink: SymbolSink) -> Self {
        self.derive(self.graph.with_data_edge(source, sink))
    }

    // -----------------------------------------------------------------------
    // Graph as proc
    // -----------------------------------------------------------------------

    /// The graph seen from outside, as a proc another catalog can register.
    /// Pure when every proc it calls is pure.
    pub fn as_proc(&self) -> Proc<S::Type> {
        let pure = self
            .nodes()
            .values()
            .filter_map(Node::proc_id)
            .all(|id| self.catalog().get(id).is_some_and(|proc| proc.pure));

        let inputs = self
            .graph
            .inputs
            .iter()
            .map(|(name, input)| {
                let slot = InputSlot {
                    names: input.names.clone(),
                    ty: input.ty.clone(),
                };
                (name.clone(), slot)
            })
            .collect();

        let output_flows = self
            .graph
            .output_flows
            .iter()
            .map(|(flow, slots)| {
                let slots: FlowSlots<S::Type> = slots
                    .iter()
                    .map(|(slot, ty)| {
                        let out = OutputSlot {
                            names: Default::default(),
                            name_sources: Default::default(),
                            ty: ty.clone(),
                        };
                        (slot.clone(), out)
                    })
                    .collect();
                (flow.clone(), slots)
            })
            .collect();

        Proc {
            pure,
            inputs,
            output_flows,
        }
    }
}
