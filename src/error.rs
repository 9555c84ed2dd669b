//! Simulation errors: contract violations and configuration failures

use thiserror::Error;

use crate::sim::steering::BehaviorKind;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Steering behavior {0:?} is already active")]
    DuplicateBehavior(BehaviorKind),
    #[error("Player slot {0} out of range (0-3)")]
    InvalidPlayerSlot(usize),
    #[error("No sprite named '{0}' is loaded")]
    MissingTexture(String),
    #[error("Invalid tuning data: {0}")]
    Tuning(#[from] serde_json::Error),
    #[error("Cannot read tuning file {path}: {source}")]
    TuningFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
