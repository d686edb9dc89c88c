//! Breadth-first, score-guided search for a verified graph.
//!
//! The population starts as the single starting context. Each round pops the
//! front, expands it, and returns the first successor scoring exactly 1.
//! Successors that still have errors go back into the population; those that
//! already generate working code but fail their samples are dropped, since
//! further wiring cannot change their behavior. The population is then kept
//! ordered by node count (ascending), ties broken by score (descending), and
//! cut down to the configured size.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use flowsynth_check::GraphContext;
use flowsynth_core::types::TypeSystem;

use crate::generation::synthesize_next_generation;

/// Limits of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Population cap applied after every expansion. Unbounded when `None`.
    pub max_population: Option<usize>,
    /// Give up after this many expansions. Unbounded when `None`.
    pub max_expansions: Option<usize>,
}

/// Counters of the last search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Contexts popped and expanded.
    pub expansions: usize,
    /// Successors produced in total.
    pub generated: usize,
    /// Working successors that failed their samples.
    pub discarded: usize,
    /// Largest population seen.
    pub peak_population: usize,
}

/// Runs searches and keeps the statistics of the last one.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthesisConfig,
    stats: SearchStats,
}

impl Synthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Synthesizer {
            config,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Searches for a context with score 1 reachable from `start`.
    ///
    /// Returns `start` itself when it already scores 1, and `None` when the
    /// population runs dry or the expansion budget is spent.
    pub fn synthesize<S: TypeSystem>(&mut self, start: &GraphContext<S>) -> Option<GraphContext<S>> {
        self.stats = SearchStats::default();
        if start.score() == 1.0 {
            return Some(start.clone());
        }

        let mut population = VecDeque::from([start.clone()]);
        while let Some(current) = population.pop_front() {
            if self
                .config
                .max_expansions
                .is_some_and(|limit| self.stats.expansions >= limit)
            {
                info!(expansions = self.stats.expansions, "expansion budget spent");
                return None;
            }
            self.stats.expansions += 1;

            let successors = synthesize_next_generation(&current);
            self.stats.generated += successors.len();
            debug!(
                expansion = self.stats.expansions,
                nodes = current.node_count(),
                score = current.score(),
                successors = successors.len(),
                population = population.len(),
                "expanded"
            );

            if let Some(solution) = successors.iter().find(|next| next.score() == 1.0) {
                info!(
                    expansions = self.stats.expansions,
                    nodes = solution.node_count(),
                    "found a solution"
                );
                return Some(solution.clone());
            }

            for next in successors {
                if next.can_generate_working_code() {
                    self.stats.discarded += 1;
                } else {
                    population.push_back(next);
                }
            }

            population
                .make_contiguous()
                .sort_by(|a, b| a.node_count().cmp(&b.node_count()).then(b.score().total_cmp(&a.score())));
            if let Some(limit) = self.config.max_population {
                population.truncate(limit);
            }
            self.stats.peak_population = self.stats.peak_population.max(population.len());
        }

        info!(expansions = self.stats.expansions, "population exhausted");
        None
    }
}

/// Search entry points as context methods.
pub trait SynthesisExt: Sized {
    fn synthesize_next_generation(&self) -> Vec<Self>;

    fn synthesize(&self, max_population: Option<usize>) -> Option<Self>;
}

impl<S: TypeSystem> SynthesisExt for GraphContext<S> {
    fn synthesize_next_generation(&self) -> Vec<Self> {
        synthesize_next_generation(self)
    }

    fn synthesize(&self, max_population: Option<usize>) -> Option<Self> {
        Synthesizer::new(SynthesisConfig {
            max_population,
            max_expansions: None,
        })
        .synthesize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsynth_check::test_support::{catalog, scenario_graph, t, to_string_context};
    use flowsynth_core::connector::{ControlSink, ControlSource, SymbolSink, SymbolSource};
    use flowsynth_core::graph::Graph;
    use flowsynth_core::id::NodeId;
    use flowsynth_core::node::ProcNode;
    use flowsynth_core::proc_def::{Proc, ProcCatalog};

    #[test]
    fn finds_the_to_string_wiring() {
        let ctx = to_string_context(scenario_graph(), catalog());
        let mut synth = Synthesizer::default();
        let solution = synth.synthesize(&ctx).expect("a solution");

        assert_eq!(solution.score(), 1.0);
        assert!(solution.problems().is_empty(), "{:?}", solution.problems());
        assert_eq!(solution.node_count(), 1);
        assert_eq!(synth.stats().expansions, 3);
    }

    #[test]
    fn solved_graphs_come_back_as_is() {
        let to_string = ProcNode::new(NodeId(1), "toString");
        let graph = scenario_graph()
            .with_control_edge(ControlSource::Entry, ControlSink::node(to_string.clone()))
            .with_control_edge(ControlSource::flow(to_string.clone(), "ok"), ControlSink::exit("done"))
            .with_data_edge(SymbolSource::input("x"), SymbolSink::input(to_string.clone(), "value"))
            .with_data_edge(SymbolSource::output(to_string, "ok", "text"), SymbolSink::output("done", "y"));
        let ctx = to_string_context(graph.clone(), catalog());
        let solution = ctx.synthesize(None).unwrap();
        assert_eq!(solution.graph(), &graph);
    }

    #[test]
    fn exhausted_population_gives_up() {
        // Nothing produces a String.
        let only_inc = ProcCatalog::new().with(
            "inc",
            Proc::new(true)
                .input("value", t("Int"))
                .output("ok", "value", t("Int")),
        );
        let ctx = to_string_context(scenario_graph(), only_inc);
        let mut synth = Synthesizer::default();
        assert!(synth.synthesize(&ctx).is_none());
        assert_eq!(synth.stats().expansions, 2);
    }

    #[test]
    fn expansion_budget_is_honored() {
        let ctx = to_string_context(scenario_graph(), catalog());
        let mut synth = Synthesizer::new(SynthesisConfig {
            max_population: None,
            max_expansions: Some(1),
        });
        assert!(synth.synthesize(&ctx).is_none());
        assert_eq!(synth.stats().expansions, 1);
    }

    #[test]
    fn wrong_but_working_candidates_are_dropped() {
        let graph = Graph::new()
            .input("x", t("String"))
            .input("z", t("String"))
            .output_slot("done", "y", t("String"));
        let ctx = to_string_context(graph, catalog());
        let mut synth = Synthesizer::default();
        // The samples pass `x` as an Int and leave `z` out: wiring `x` gives
        // the wrong output and wiring `z` faults on the missing input.
        assert!(synth.synthesize(&ctx).is_none());
        assert!(synth.stats().discarded >= 2);
    }
}
