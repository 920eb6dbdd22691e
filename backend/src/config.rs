use spindare_shared::{ChallengeEntry, ChallengePool, CommitPolicy, RevealSweep, SpinConfig};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::HostError;

/// Host settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostConfig {
    pub spin: SpinConfig,
    pub seed: Option<u64>,
    pub deck_path: Option<PathBuf>,
}

impl HostConfig {
    pub fn from_env() -> Result<Self, HostError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HostError> {
        let mut spin = match lookup("SPIN_POLICY").as_deref().map(str::trim) {
            None | Some("") | Some("early") => SpinConfig::early_commit(),
            Some("late") => SpinConfig::late_commit(),
            Some(other) => {
                return Err(HostError::Config {
                    key: "SPIN_POLICY",
                    value: other.to_string(),
                })
            }
        };

        if let Some(ms) = parse_var::<u64>(&lookup, "SPIN_DURATION_MS")? {
            spin.timeline.spin_duration = Duration::from_millis(ms);
        }

        let delay = parse_var::<u64>(&lookup, "REVEAL_DELAY_MS")?;
        let sweep = parse_var::<u64>(&lookup, "REVEAL_SWEEP_MS")?;
        if delay.is_some() || sweep.is_some() {
            let base = spin.timeline.reveal_sweep.unwrap_or(RevealSweep {
                delay: Duration::ZERO,
                duration: Duration::ZERO,
            });
            spin.timeline.reveal_sweep = Some(RevealSweep {
                delay: delay.map(Duration::from_millis).unwrap_or(base.delay),
                duration: sweep.map(Duration::from_millis).unwrap_or(base.duration),
            });
        }

        if let Some(min) = parse_var(&lookup, "SPIN_MIN_TURNS")? {
            spin.planner.min_turns = min;
        }
        if let Some(max) = parse_var(&lookup, "SPIN_MAX_TURNS")? {
            spin.planner.max_turns = max;
        }
        if let Some(degrees) = parse_var(&lookup, "SPIN_MIN_DEGREES")? {
            spin.planner.min_spin_degrees = degrees;
        }
        if let Some(factor) = parse_var(&lookup, "MOMENTUM_FACTOR")? {
            spin.planner.momentum_factor = factor;
        }

        spin.validate()?;

        Ok(Self {
            spin,
            seed: parse_var(&lookup, "RNG_SEED")?,
            deck_path: lookup("DECK_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn policy(&self) -> CommitPolicy {
        self.spin.policy
    }

    /// The configured deck, or the built-in one.
    pub fn load_pool(&self) -> Result<ChallengePool, HostError> {
        match &self.deck_path {
            Some(path) => load_deck(path),
            None => Ok(ChallengePool::builtin()?),
        }
    }
}

/// Reads a JSON array of challenge entries.
pub fn load_deck(path: &Path) -> Result<ChallengePool, HostError> {
    let raw = std::fs::read_to_string(path)?;
    let entries: Vec<ChallengeEntry> = serde_json::from_str(&raw)?;
    tracing::info!("Loaded {} challenges from {}", entries.len(), path.display());
    Ok(ChallengePool::load(entries)?)
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, HostError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| HostError::Config { key, value: raw }),
    }
}
