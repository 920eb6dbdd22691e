use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::challenge_pool::{ChallengeEntry, ChallengePool};
use crate::challenge_selector::ChallengeSelector;
use crate::constants::{
    EARLY_SPIN_DURATION_MS, LATE_SPIN_DURATION_MS, REVEAL_DELAY_MS, REVEAL_SWEEP_MS,
};
use crate::error::{ConfigurationError, SpinError};
use crate::random::{RandomSource, RngSource};
use crate::rotation_planner::{PlannerConfig, RotationPlanner};
use crate::wheel_sectors::{normalize_angle, sector_of, ColorSector};

/// When the outcome colour is decided. Fixed for the lifetime of a game
/// instance; the two policies never mix.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Colour is drawn at spin start and the rotation is steered onto it.
    /// The committed colour is authoritative.
    #[default]
    EarlyCommit,
    /// Colour is read from wherever the wheel stops.
    LateCommit,
}

/// Secondary timer that floods the dial with the winning colour.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RevealSweep {
    /// Offset from spin start.
    pub delay: Duration,
    pub duration: Duration,
}

impl RevealSweep {
    pub fn ends_after(&self) -> Duration {
        self.delay + self.duration
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SpinTimeline {
    /// Declared length of the rotation animation.
    pub spin_duration: Duration,
    /// Only used for spins with a committed colour.
    pub reveal_sweep: Option<RevealSweep>,
}

impl SpinTimeline {
    pub fn early_commit() -> Self {
        Self {
            spin_duration: Duration::from_millis(EARLY_SPIN_DURATION_MS),
            reveal_sweep: Some(RevealSweep {
                delay: Duration::from_millis(REVEAL_DELAY_MS),
                duration: Duration::from_millis(REVEAL_SWEEP_MS),
            }),
        }
    }

    pub fn late_commit() -> Self {
        Self {
            spin_duration: Duration::from_millis(LATE_SPIN_DURATION_MS),
            reveal_sweep: None,
        }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.spin_duration.is_zero() {
            return Err(ConfigurationError::InvalidTimeline("spin duration is zero"));
        }
        if let Some(sweep) = self.reveal_sweep {
            if sweep.ends_after() > self.spin_duration {
                return Err(ConfigurationError::InvalidTimeline(
                    "reveal sweep must finish within the spin duration",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinConfig {
    pub policy: CommitPolicy,
    pub timeline: SpinTimeline,
    pub planner: PlannerConfig,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self::early_commit()
    }
}

impl SpinConfig {
    pub fn early_commit() -> Self {
        Self {
            policy: CommitPolicy::EarlyCommit,
            timeline: SpinTimeline::early_commit(),
            planner: PlannerConfig::default(),
        }
    }

    pub fn late_commit() -> Self {
        Self {
            policy: CommitPolicy::LateCommit,
            timeline: SpinTimeline::late_commit(),
            planner: PlannerConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.planner.validate()?;
        self.timeline.validate()?;
        if self.policy == CommitPolicy::LateCommit && self.timeline.reveal_sweep.is_some() {
            return Err(ConfigurationError::InvalidTimeline(
                "late-commit spins have no colour to sweep",
            ));
        }
        Ok(())
    }
}

/// How a spin was initiated.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum SpinRequest {
    FreeSpin,
    SteeredSpin { target_color: ColorSector },
    DragContinuation { current_angle: f64, delta_angle: f64 },
}

/// Result of one completed spin. Produced exactly once.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinOutcome {
    pub spin_id: u64,
    /// Resting angle folded into `[0, 360)`.
    pub final_angle: f64,
    pub color: ColorSector,
    pub challenge: ChallengeEntry,
}

/// What the presentation layer needs to animate a spin.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinPlan {
    pub spin_id: u64,
    pub request: SpinRequest,
    pub start_angle: f64,
    pub target_angle: f64,
    pub duration: Duration,
    /// Offset from spin start at which the outcome is revealed.
    pub reveal_after: Duration,
    pub committed_color: Option<ColorSector>,
    pub reveal_sweep: Option<RevealSweep>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum SpinEvent {
    Started(SpinPlan),
    RevealSweepStarted {
        spin_id: u64,
        color: ColorSector,
        duration: Duration,
    },
    Outcome(SpinOutcome),
    Cancelled { spin_id: u64 },
}

/// The spin currently in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSpin {
    pub spin_id: u64,
    pub request: SpinRequest,
    pub start_angle: f64,
    /// Follows the pointer while dragging; fixed once released.
    pub target_angle: f64,
    /// Drag start while dragging, release time afterwards.
    pub started_at: Instant,
    pub dragging: bool,
    pub committed_color: Option<ColorSector>,
    sweep_started: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SpinState {
    #[default]
    Idle,
    Spinning(ActiveSpin),
    Revealing(SpinOutcome),
}

impl SpinState {
    pub fn name(&self) -> &'static str {
        match self {
            SpinState::Idle => "idle",
            SpinState::Spinning(spin) if spin.dragging => "dragging",
            SpinState::Spinning(_) => "spinning",
            SpinState::Revealing(_) => "revealing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SpinState::Idle)
    }
}

/// Sequences spin, settle and reveal for one game instance.
///
/// Time never advances on its own: the host passes `now` into every
/// time-dependent call and drives [`SpinStateMachine::poll`] from its own
/// timers.
#[derive(Debug)]
pub struct SpinStateMachine<R> {
    pool: Arc<ChallengePool>,
    config: SpinConfig,
    planner: RotationPlanner<R>,
    selector: ChallengeSelector<R>,
    state: SpinState,
    resting_angle: f64,
    last_spin_id: u64,
    /// Whether the spin being revealed ran a reveal sweep.
    revealed_swept: bool,
}

impl SpinStateMachine<RngSource<rand::rngs::StdRng>> {
    /// Reproducible instance: planner and selector get independent streams
    /// derived from `seed`.
    pub fn seeded(
        pool: Arc<ChallengePool>,
        config: SpinConfig,
        seed: u64,
    ) -> Result<Self, SpinError> {
        Self::new(
            pool,
            config,
            RngSource::seeded(seed),
            RngSource::seeded(seed.wrapping_add(0x9E37_79B9_7F4A_7C15)),
        )
    }

    pub fn from_entropy(pool: Arc<ChallengePool>, config: SpinConfig) -> Result<Self, SpinError> {
        Self::new(pool, config, RngSource::from_entropy(), RngSource::from_entropy())
    }
}

impl<R: RandomSource> SpinStateMachine<R> {
    pub fn new(
        pool: Arc<ChallengePool>,
        config: SpinConfig,
        planner_rng: R,
        selector_rng: R,
    ) -> Result<Self, SpinError> {
        config.validate()?;
        let planner = RotationPlanner::new(config.planner.clone(), planner_rng)?;
        Ok(Self {
            pool,
            config,
            planner,
            selector: ChallengeSelector::new(selector_rng),
            state: SpinState::Idle,
            resting_angle: 0.0,
            last_spin_id: 0,
            revealed_swept: false,
        })
    }

    /// Starts the dial at `angle` instead of zero.
    pub fn with_resting_angle(mut self, angle: f64) -> Self {
        self.resting_angle = angle;
        self
    }

    pub fn current_state(&self) -> &SpinState {
        &self.state
    }

    pub fn is_spinning(&self) -> bool {
        !self.state.is_idle()
    }

    /// Where the dial last came to rest. Not normalized, so the presentation
    /// can keep animating forward from it.
    pub fn resting_angle(&self) -> f64 {
        self.resting_angle
    }

    pub fn policy(&self) -> CommitPolicy {
        self.config.policy
    }

    pub fn config(&self) -> &SpinConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<ChallengePool> {
        &self.pool
    }

    pub fn active_spin_id(&self) -> Option<u64> {
        match &self.state {
            SpinState::Spinning(spin) => Some(spin.spin_id),
            SpinState::Revealing(outcome) => Some(outcome.spin_id),
            SpinState::Idle => None,
        }
    }

    pub fn start_free_spin(&mut self, now: Instant) -> Result<SpinPlan, SpinError> {
        self.require_idle("start a spin")?;

        let start_angle = self.resting_angle;
        let (request, target_angle, committed_color) = match self.config.policy {
            CommitPolicy::EarlyCommit => {
                let color = self.planner.draw_sector();
                let target = self.planner.plan_steered_spin(start_angle, color);
                (SpinRequest::SteeredSpin { target_color: color }, target, Some(color))
            }
            CommitPolicy::LateCommit => {
                let target = self.planner.plan_free_spin(start_angle);
                (SpinRequest::FreeSpin, target, None)
            }
        };

        let spin = self.begin(request, start_angle, target_angle, now, false, committed_color);
        log::info!(
            "spin {} started: {:.2} -> {:.2} ({:?})",
            spin.spin_id,
            start_angle,
            target_angle,
            request
        );
        let plan = self.plan_for(&spin);
        self.state = SpinState::Spinning(spin);
        Ok(plan)
    }

    pub fn start_drag(&mut self, pointer_delta: f64, now: Instant) -> Result<(), SpinError> {
        self.require_idle("start a drag")?;

        let start_angle = self.resting_angle;
        let request = SpinRequest::DragContinuation {
            current_angle: start_angle,
            delta_angle: pointer_delta,
        };
        let spin = self.begin(request, start_angle, start_angle + pointer_delta, now, true, None);
        log::debug!("drag {} started at {:.2}", spin.spin_id, start_angle);
        self.state = SpinState::Spinning(spin);
        Ok(())
    }

    /// Adds to the held drag and returns the live dial angle.
    pub fn continue_drag(&mut self, pointer_delta: f64) -> Result<f64, SpinError> {
        let spin = self.dragging_spin_mut("continue a drag")?;
        if let SpinRequest::DragContinuation { delta_angle, .. } = &mut spin.request {
            *delta_angle += pointer_delta;
        }
        spin.target_angle += pointer_delta;
        Ok(spin.target_angle)
    }

    /// Releases the drag: applies momentum and starts the settle clock.
    pub fn end_drag(&mut self, now: Instant) -> Result<SpinPlan, SpinError> {
        let state_name = self.state.name();
        let (start_angle, delta, drag_started) = match &self.state {
            SpinState::Spinning(spin) if spin.dragging => match spin.request {
                SpinRequest::DragContinuation { delta_angle, .. } => {
                    (spin.start_angle, delta_angle, spin.started_at)
                }
                _ => return Err(SpinError::invalid_transition("end a drag", state_name)),
            },
            _ => return Err(SpinError::invalid_transition("end a drag", state_name)),
        };

        let elapsed = now.saturating_duration_since(drag_started);
        let target = self.planner.plan_drag_continuation(start_angle, delta, elapsed);

        let spin = self.dragging_spin_mut("end a drag")?;
        spin.target_angle = target;
        spin.started_at = now;
        spin.dragging = false;
        let spin = spin.clone();
        Ok(self.plan_for(&spin))
    }

    /// Next instant at which [`SpinStateMachine::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let spin = self.animating_spin()?;
        match self.pending_sweep(spin) {
            Some(sweep) => Some(spin.started_at + sweep.delay),
            None => Some(spin.started_at + self.reveal_after(spin)),
        }
    }

    /// Fires every timer that is due at `now`, in order.
    pub fn poll(&mut self, now: Instant) -> Result<Vec<SpinEvent>, SpinError> {
        let mut events = Vec::new();

        let sweep_color = match self.animating_spin() {
            Some(spin) => match (self.pending_sweep(spin), spin.committed_color) {
                (Some(sweep), Some(color)) if now >= spin.started_at + sweep.delay => {
                    Some((spin.spin_id, color, sweep.duration))
                }
                _ => None,
            },
            None => return Ok(events),
        };

        if let Some((spin_id, color, duration)) = sweep_color {
            if let SpinState::Spinning(spin) = &mut self.state {
                spin.sweep_started = true;
            }
            log::debug!("spin {} reveal sweep: {}", spin_id, color);
            events.push(SpinEvent::RevealSweepStarted {
                spin_id,
                color,
                duration,
            });
        }

        let due = self
            .animating_spin()
            .map(|spin| now >= spin.started_at + self.reveal_after(spin))
            .unwrap_or(false);
        if due {
            events.push(SpinEvent::Outcome(self.reveal()?));
        }

        Ok(events)
    }

    /// The presentation reports that the rotation animation has finished.
    pub fn on_settle(&mut self) -> Result<SpinOutcome, SpinError> {
        if self.animating_spin().is_none() {
            return Err(SpinError::invalid_transition("settle", self.state.name()));
        }
        self.reveal()
    }

    /// The presentation is done showing the outcome.
    pub fn finish_reveal(&mut self) -> Result<(), SpinError> {
        match self.state {
            SpinState::Revealing(_) => {
                self.state = SpinState::Idle;
                Ok(())
            }
            _ => Err(SpinError::invalid_transition(
                "finish a reveal",
                self.state.name(),
            )),
        }
    }

    /// Abandons whatever is in flight. Never produces an outcome. Returns
    /// whether there was anything to cancel.
    pub fn cancel(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            SpinState::Idle => false,
            SpinState::Spinning(spin) => {
                let phase = if spin.dragging { "dragging" } else { "spinning" };
                log::info!("spin {} cancelled while {}", spin.spin_id, phase);
                true
            }
            SpinState::Revealing(outcome) => {
                log::info!("spin {} cancelled while revealing", outcome.spin_id);
                true
            }
        }
    }

    /// Fraction of the reveal sweep drawn so far, for committed spins.
    pub fn sweep_progress(&self, now: Instant) -> Option<f64> {
        match &self.state {
            SpinState::Spinning(spin) if !spin.dragging => {
                spin.committed_color?;
                let sweep = self.config.timeline.reveal_sweep?;
                let sweep_start = spin.started_at + sweep.delay;
                let into = now.saturating_duration_since(sweep_start).as_secs_f64();
                let total = sweep.duration.as_secs_f64();
                if total == 0.0 {
                    return Some(if now >= sweep_start { 1.0 } else { 0.0 });
                }
                Some((into / total).clamp(0.0, 1.0))
            }
            SpinState::Revealing(_) if self.revealed_swept => Some(1.0),
            _ => None,
        }
    }

    fn begin(
        &mut self,
        request: SpinRequest,
        start_angle: f64,
        target_angle: f64,
        now: Instant,
        dragging: bool,
        committed_color: Option<ColorSector>,
    ) -> ActiveSpin {
        self.last_spin_id += 1;
        ActiveSpin {
            spin_id: self.last_spin_id,
            request,
            start_angle,
            target_angle,
            started_at: now,
            dragging,
            committed_color,
            sweep_started: false,
        }
    }

    fn plan_for(&self, spin: &ActiveSpin) -> SpinPlan {
        SpinPlan {
            spin_id: spin.spin_id,
            request: spin.request,
            start_angle: spin.start_angle,
            target_angle: spin.target_angle,
            duration: self.config.timeline.spin_duration,
            reveal_after: self.reveal_after(spin),
            committed_color: spin.committed_color,
            reveal_sweep: spin
                .committed_color
                .and(self.config.timeline.reveal_sweep),
        }
    }

    /// Committed spins with a sweep reveal when the sweep ends; everything
    /// else reveals when the rotation animation ends.
    fn reveal_after(&self, spin: &ActiveSpin) -> Duration {
        match (spin.committed_color, self.config.timeline.reveal_sweep) {
            (Some(_), Some(sweep)) => sweep.ends_after(),
            _ => self.config.timeline.spin_duration,
        }
    }

    fn pending_sweep(&self, spin: &ActiveSpin) -> Option<RevealSweep> {
        if spin.sweep_started || spin.committed_color.is_none() {
            return None;
        }
        self.config.timeline.reveal_sweep
    }

    fn animating_spin(&self) -> Option<&ActiveSpin> {
        match &self.state {
            SpinState::Spinning(spin) if !spin.dragging => Some(spin),
            _ => None,
        }
    }

    fn dragging_spin_mut(&mut self, command: &'static str) -> Result<&mut ActiveSpin, SpinError> {
        let state_name = self.state.name();
        match &mut self.state {
            SpinState::Spinning(spin) if spin.dragging => Ok(spin),
            _ => Err(SpinError::invalid_transition(command, state_name)),
        }
    }

    fn require_idle(&self, command: &'static str) -> Result<(), SpinError> {
        if self.state.is_idle() {
            Ok(())
        } else {
            Err(SpinError::invalid_transition(command, self.state.name()))
        }
    }

    /// Spinning -> Revealing. Resolves the colour and draws the challenge.
    fn reveal(&mut self) -> Result<SpinOutcome, SpinError> {
        let spin = match std::mem::take(&mut self.state) {
            SpinState::Spinning(spin) => spin,
            other => {
                let name = other.name();
                self.state = other;
                return Err(SpinError::invalid_transition("reveal", name));
            }
        };

        let resting = sector_of(spin.target_angle);
        let color = match spin.committed_color {
            Some(committed) => {
                if committed != resting {
                    log::error!(
                        "spin {} committed to {} but came to rest over {} at {:.4}",
                        spin.spin_id,
                        committed,
                        resting,
                        spin.target_angle
                    );
                }
                committed
            }
            None => resting,
        };

        self.resting_angle = spin.target_angle;
        self.revealed_swept =
            spin.committed_color.is_some() && self.config.timeline.reveal_sweep.is_some();
        let challenge = self.selector.pick(&self.pool, color)?;
        let outcome = SpinOutcome {
            spin_id: spin.spin_id,
            final_angle: normalize_angle(spin.target_angle),
            color,
            challenge,
        };

        log::info!(
            "spin {} landed on {} at {:.2}: challenge #{}",
            outcome.spin_id,
            outcome.color,
            outcome.final_angle,
            outcome.challenge.id
        );
        self.state = SpinState::Revealing(outcome.clone());
        Ok(outcome)
    }
}
