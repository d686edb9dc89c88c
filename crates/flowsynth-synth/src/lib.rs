//! Graph completion by search.
//!
//! [`synthesize_next_generation`] enumerates the ways one loose end of a
//! [`GraphContext`](flowsynth_check::GraphContext) can be tied up;
//! [`Synthesizer`] searches those successors breadth-first until one passes
//! every sample.

pub mod generation;
pub mod search;

pub use generation::synthesize_next_generation;
pub use search::{SearchStats, SynthesisConfig, SynthesisExt, Synthesizer};
