use thiserror::Error;

use crate::wheel_sectors::ColorSector;

/// Raised while assembling a game instance. Fatal: the game must not start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("no challenges configured for the {0} sector")]
    EmptySector(ColorSector),
    #[error("challenge id {0} appears more than once")]
    DuplicateId(u32),
    #[error("challenge {id} is filed under {bucket} but declares {declared}")]
    MismatchedColor {
        id: u32,
        bucket: ColorSector,
        declared: ColorSector,
    },
    #[error("full-turn range {min}..={max} is empty")]
    InvalidTurnRange { min: u32, max: u32 },
    #[error("momentum factor must be finite and at least 1.0, got {0}")]
    InvalidMomentum(f64),
    #[error("minimum spin must be finite and non-negative, got {0}")]
    InvalidSpinFloor(f64),
    #[error("invalid timeline: {0}")]
    InvalidTimeline(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpinError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The command is not accepted in the current state. Recoverable: the
    /// command had no effect.
    #[error("cannot {command} while {state}")]
    InvalidStateTransition {
        command: &'static str,
        state: &'static str,
    },
}

impl SpinError {
    pub fn invalid_transition(command: &'static str, state: &'static str) -> Self {
        SpinError::InvalidStateTransition { command, state }
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, SpinError::InvalidStateTransition { .. })
    }
}
