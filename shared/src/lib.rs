//! Spin resolution and challenge selection for the SPIN & DARE wheel.
//!
//! Everything here is synchronous and host-agnostic: the host supplies the
//! clock (`now` arguments) and drives timers, and this crate decides angles,
//! sectors and challenges.

pub mod challenge_deck;
pub mod challenge_pool;
pub mod challenge_selector;
pub mod constants;
pub mod error;
pub mod random;
pub mod rotation_planner;
pub mod shared_wheel_game;
pub mod wheel_sectors;

pub use challenge_pool::{ChallengeEntry, ChallengePool};
pub use challenge_selector::ChallengeSelector;
pub use error::{ConfigurationError, SpinError};
pub use random::{RandomSource, RngSource, ScriptedRandom};
pub use rotation_planner::{PlannerConfig, RotationPlanner};
pub use shared_wheel_game::{
    ActiveSpin, CommitPolicy, RevealSweep, SpinConfig, SpinEvent, SpinOutcome, SpinPlan,
    SpinRequest, SpinState, SpinStateMachine, SpinTimeline,
};
pub use wheel_sectors::{normalize_angle, sector_of, ColorSector, SectorInfo, SECTORS};
