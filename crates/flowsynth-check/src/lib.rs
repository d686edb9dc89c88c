//! Analysis, validation, execution and scoring of flow graphs.
//!
//! [`GraphContext`] is the entry point: it owns a graph snapshot together with
//! everything derived from it, and every edit produces a fresh context.

pub mod analysis;
pub mod context;
pub mod interpreter;
pub mod sample;
pub mod score;
pub mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use context::{Environment, GraphContext};
pub use interpreter::{compile, BridgeError, ImplTable, Program, RuntimeError, Value, ValueMap};
pub use sample::{Sample, SampleMessage, SampleSpec};
pub use score::ScoreWeights;
pub use validate::{GraphComponent, GraphProblem, ProblemKind, Severity};
