use thiserror::Error;

use crate::molecule::MoleculeType;

#[derive(Error, Debug)]
pub enum SimulationError {
    // Potential parameters
    #[error("Sigma must be finite and non-zero, got {sigma}")]
    InvalidSigma { sigma: f64 },

    #[error("Epsilon must be finite and non-negative, got {epsilon}")]
    InvalidEpsilon { epsilon: f64 },

    // Ensemble
    #[error("No room for another molecule (capacity {capacity} molecules)")]
    CapacityExhausted { capacity: usize },

    #[error("Molecule type {molecule_type:?} is not supported by the simulation model")]
    UnsupportedMoleculeType { molecule_type: MoleculeType },

    // Configuration
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
