//! Heuristic scoring of incomplete graphs.
//!
//! Working graphs are scored by their samples (1 or 0). Everything else that
//! synthesis could still fix gets a value strictly between 0 and 1: a product
//! of decay terms that shrinks as unconnected structure and problems pile up,
//! nudged upward by name matches between wired symbols and the slots they
//! feed.

use serde::{Deserialize, Serialize};

/// Decay bases of the heuristic. Only the monotone shape matters; the
/// defaults are tuning values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub unconnected_control_source: f64,
    pub unconnected_control_sink: f64,
    /// Largest share of the score name matches can add.
    pub name_bonus: f64,
    pub name_decay: f64,
    pub symbol_imbalance: f64,
    pub symbol_total: f64,
    pub problem: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            unconnected_control_source: 0.75,
            unconnected_control_sink: 0.9,
            name_bonus: 0.1,
            name_decay: 0.9,
            symbol_imbalance: 0.9,
            symbol_total: 0.95,
            problem: 0.95,
        }
    }
}

/// Structure counts the heuristic is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub unconnected_control_sources: usize,
    pub unconnected_control_sinks: usize,
    pub unconnected_symbol_sources: usize,
    pub unconnected_symbol_sinks: usize,
    /// Summed [`name_proximity`] over the resolved data edges.
    pub name_proximity: usize,
    pub problems: usize,
}

impl ScoreWeights {
    /// Score of a fixable graph that does not work yet. Always below 1.
    pub fn heuristic(&self, tally: &Tally) -> f64 {
        let symbols_imbalance = tally
            .unconnected_symbol_sources
            .abs_diff(tally.unconnected_symbol_sinks);
        let symbols_total = tally.unconnected_symbol_sources + tally.unconnected_symbol_sinks;

        let score = decay(self.unconnected_control_source, tally.unconnected_control_sources)
            * decay(self.unconnected_control_sink, tally.unconnected_control_sinks)
            * (1.0 - self.name_bonus * decay(self.name_decay, tally.name_proximity))
            * decay(self.symbol_imbalance, symbols_imbalance)
            * decay(self.symbol_total, symbols_total)
            * decay(self.problem, tally.problems);

        score.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Number of names in `known` that also occur in `names`.
pub fn name_proximity<A: AsRef<str>, B: AsRef<str>>(known: &[A], names: &[B]) -> usize {
    known
        .iter()
        .filter(|k| names.iter().any(|n| n.as_ref() == k.as_ref()))
        .count()
}

fn decay(base: f64, n: usize) -> f64 {
    base.powi(i32::try_from(n).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tally_is_just_below_one() {
        let score = ScoreWeights::default().heuristic(&Tally::default());
        // Only the name term bites: 1 - 0.1 * 0.9^0.
        assert!((score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn more_unconnected_structure_scores_lower() {
        let weights = ScoreWeights::default();
        let base = Tally {
            unconnected_control_sources: 1,
            unconnected_symbol_sinks: 1,
            ..Tally::default()
        };
        let worse = [
            Tally {
                unconnected_control_sources: 2,
                ..base
            },
            Tally {
                unconnected_control_sinks: 1,
                ..base
            },
            Tally {
                unconnected_symbol_sinks: 2,
                ..base
            },
            Tally { problems: 3, ..base },
        ];
        for tally in worse {
            assert!(weights.heuristic(&tally) < weights.heuristic(&base), "{tally:?}");
        }
    }

    #[test]
    fn name_matches_raise_the_score() {
        let weights = ScoreWeights::default();
        let plain = weights.heuristic(&Tally::default());
        let named = weights.heuristic(&Tally {
            name_proximity: 2,
            ..Tally::default()
        });
        assert!(named > plain);
        assert!(named < 1.0);
    }

    #[test]
    fn never_reaches_one() {
        let weights = ScoreWeights {
            name_bonus: 0.0,
            ..ScoreWeights::default()
        };
        assert!(weights.heuristic(&Tally::default()) < 1.0);
    }

    #[test]
    fn proximity_counts_exact_matches() {
        assert_eq!(name_proximity(&["value", "number"], &["x", "number"]), 1);
        assert_eq!(name_proximity(&["y"], &["text", "x"]), 0);
        assert_eq!(name_proximity::<&str, &str>(&[], &["x"]), 0);
    }

    #[test]
    fn weights_fill_in_missing_fields() {
        let weights: ScoreWeights = serde_json::from_str(r#"{"problem": 0.5}"#).unwrap();
        assert_eq!(weights.problem, 0.5);
        assert_eq!(weights.unconnected_control_source, 0.75);
    }
}
