use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_TURNS, DEFAULT_MIN_SPIN_DEGREES, DEFAULT_MIN_TURNS, DEFAULT_MOMENTUM_FACTOR,
    FULL_TURN_DEGREES, SECTOR_COUNT, SECTOR_EDGE_MARGIN, SECTOR_SPAN_DEGREES,
};
use crate::error::ConfigurationError;
use crate::random::RandomSource;
use crate::wheel_sectors::{normalize_angle, ColorSector};

/// Tunables for target-angle planning.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Inclusive range of full turns added to every planned spin.
    pub min_turns: u32,
    pub max_turns: u32,
    /// Smallest forward delta that still reads as a real spin.
    pub min_spin_degrees: f64,
    /// Multiplier applied to a released drag. Never below 1.0.
    pub momentum_factor: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_turns: DEFAULT_MIN_TURNS,
            max_turns: DEFAULT_MAX_TURNS,
            min_spin_degrees: DEFAULT_MIN_SPIN_DEGREES,
            momentum_factor: DEFAULT_MOMENTUM_FACTOR,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_turns > self.max_turns {
            return Err(ConfigurationError::InvalidTurnRange {
                min: self.min_turns,
                max: self.max_turns,
            });
        }
        if !self.min_spin_degrees.is_finite() || self.min_spin_degrees < 0.0 {
            return Err(ConfigurationError::InvalidSpinFloor(self.min_spin_degrees));
        }
        if !self.momentum_factor.is_finite() || self.momentum_factor < 1.0 {
            return Err(ConfigurationError::InvalidMomentum(self.momentum_factor));
        }
        Ok(())
    }
}

/// Produces target rotation angles for the three ways a spin can start.
#[derive(Debug, Clone)]
pub struct RotationPlanner<R> {
    config: PlannerConfig,
    rng: R,
}

impl<R: RandomSource> RotationPlanner<R> {
    pub fn new(config: PlannerConfig, rng: R) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Random landing anywhere on the dial.
    ///
    /// Draws, in order: the full-turn count, the sector, and the offset
    /// inside that sector.
    pub fn plan_free_spin(&mut self, current_angle: f64) -> f64 {
        let turns = self.draw_turns();
        let sector = self.rng.uniform_int(0, SECTOR_COUNT as u32 - 1);
        let within = self.draw_within_sector();

        let whole = turns as f64 * FULL_TURN_DEGREES + sector as f64 * SECTOR_SPAN_DEGREES;
        let extra = self.extra_turns(whole + within);
        let target = current_angle + (whole + extra * FULL_TURN_DEGREES + within);

        log::debug!(
            "free spin planned: {:.2} -> {:.2} ({} turns, sector {}, offset {:.2})",
            current_angle,
            target,
            turns,
            sector,
            within
        );
        target
    }

    /// Landing guaranteed inside `target_color`.
    ///
    /// The sector offset is measured from the wheel's current whole-turn
    /// origin, so the result lands in `target_color` whatever
    /// `current_angle` is.
    pub fn plan_steered_spin(&mut self, current_angle: f64, target_color: ColorSector) -> f64 {
        let turns = self.draw_turns();
        let within = self.draw_within_sector();

        let origin = current_angle - normalize_angle(current_angle);
        let whole = origin + turns as f64 * FULL_TURN_DEGREES + target_color.lower_bound();
        let extra = self.extra_turns(whole + within - current_angle);
        // Whole-degree parts first so the single rounding of `within` cannot
        // cross a sector boundary.
        let target = whole + extra * FULL_TURN_DEGREES + within;

        log::debug!(
            "steered spin planned: {:.2} -> {:.2} ({}, {} turns, offset {:.2})",
            current_angle,
            target,
            target_color,
            turns,
            within
        );
        target
    }

    /// Extends a released drag by the momentum factor. The landing sector is
    /// whatever the pointer ends up over.
    pub fn plan_drag_continuation(
        &mut self,
        current_angle: f64,
        pointer_delta: f64,
        elapsed_drag_time: Duration,
    ) -> f64 {
        let target = current_angle + pointer_delta * self.config.momentum_factor;

        let secs = elapsed_drag_time.as_secs_f64();
        if secs > 0.0 {
            log::debug!(
                "drag released at {:.1} deg/s: {:.2} -> {:.2}",
                pointer_delta / secs,
                current_angle,
                target
            );
        }
        target
    }

    /// Uniform colour draw for early-commit spins.
    pub fn draw_sector(&mut self) -> ColorSector {
        ColorSector::from_index(self.rng.uniform_int(0, SECTOR_COUNT as u32 - 1) as usize)
    }

    fn draw_turns(&mut self) -> u32 {
        self.rng
            .uniform_int(self.config.min_turns, self.config.max_turns)
    }

    fn draw_within_sector(&mut self) -> f64 {
        self.rng
            .uniform_f64(0.0, SECTOR_SPAN_DEGREES)
            .clamp(0.0, SECTOR_SPAN_DEGREES - SECTOR_EDGE_MARGIN)
    }

    /// Whole turns to add so a forward delta clears the minimum spin and is
    /// strictly positive. Whole turns keep the landing sector unchanged.
    fn extra_turns(&self, delta: f64) -> f64 {
        let mut extra = 0.0;
        if delta < self.config.min_spin_degrees {
            extra = ((self.config.min_spin_degrees - delta) / FULL_TURN_DEGREES).ceil();
        }
        if delta + extra * FULL_TURN_DEGREES <= 0.0 {
            extra += 1.0;
        }
        extra
    }
}
