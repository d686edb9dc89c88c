//! Problem files: everything a check or a search needs, in one JSON document.
//!
//! ```json
//! {
//!   "types": {"coercions": [["Int", "Number"]], "top": "Any"},
//!   "procs": {"toString": {"pure": true, "inputs": {...}, "output_flows": {...}}},
//!   "graph": {"inputs": {...}, "output_flows": {...}, "control_flow": [], "data_flow": []},
//!   "samples": [{"input": {"x": 5}, "output": {"y": "5"}, "output_flow": "done",
//!                "impl": {"toString": "to_string"}}]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use flowsynth_check::{BridgeError, Environment, GraphContext, SampleSpec, ScoreWeights};
use flowsynth_core::{Graph, NominalTypes, ProcCatalog, TypeName};

/// Failures loading or saving problem data.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("sample {index}: {source}")]
    Sample {
        index: usize,
        #[source]
        source: BridgeError,
    },

    #[error("failed to serialize: {0}")]
    Serialize(#[from] flowsynth_core::CoreError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The on-disk problem description.
#[derive(Debug, Deserialize)]
pub struct ProblemFile {
    #[serde(default)]
    pub types: NominalTypes,
    #[serde(default)]
    pub procs: ProcCatalog<TypeName>,
    pub graph: Graph<TypeName>,
    #[serde(default)]
    pub samples: Vec<SampleSpec>,
    #[serde(default)]
    pub weights: ScoreWeights,
}

impl ProblemFile {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves the samples and builds the starting context.
    pub fn into_context(self) -> Result<GraphContext<NominalTypes>, CliError> {
        let samples = self
            .samples
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.resolve(&self.procs)
                    .map_err(|source| CliError::Sample { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let env = Environment::new(self.types, self.procs)
            .with_samples(samples)
            .with_weights(self.weights);
        Ok(GraphContext::new(self.graph, Arc::new(env)))
    }
}
