use crate::challenge_pool::{ChallengeEntry, ChallengePool};
use crate::error::ConfigurationError;
use crate::random::RandomSource;
use crate::wheel_sectors::{sector_of, ColorSector};

/// Uniform draws from a pool, using its own instance-scoped random source.
#[derive(Debug, Clone)]
pub struct ChallengeSelector<R> {
    rng: R,
}

impl<R: RandomSource> ChallengeSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Picks one entry uniformly from `color`'s bucket.
    ///
    /// Only fails if the pool somehow has an empty bucket, which
    /// [`ChallengePool::load`] already rules out.
    pub fn pick(
        &mut self,
        pool: &ChallengePool,
        color: ColorSector,
    ) -> Result<ChallengeEntry, ConfigurationError> {
        let bucket = pool.entries_for(color);
        if bucket.is_empty() {
            return Err(ConfigurationError::EmptySector(color));
        }
        let index = self.rng.uniform_index(bucket.len());
        Ok(bucket[index].clone())
    }

    /// Picks uniformly across every colour.
    pub fn pick_any(&mut self, pool: &ChallengePool) -> Option<ChallengeEntry> {
        let total = pool.len();
        if total == 0 {
            return None;
        }
        let index = self.rng.uniform_index(total);
        pool.iter().nth(index).cloned()
    }

    /// Resolves the sector under `angle` and picks from it.
    pub fn pick_for_angle(
        &mut self,
        pool: &ChallengePool,
        angle: f64,
    ) -> Result<ChallengeEntry, ConfigurationError> {
        self.pick(pool, sector_of(angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RngSource, ScriptedRandom};

    #[test]
    fn test_pick_stays_within_color() {
        let pool = ChallengePool::builtin().unwrap();
        let mut selector = ChallengeSelector::new(RngSource::seeded(1));
        for color in ColorSector::ALL {
            for _ in 0..50 {
                assert_eq!(selector.pick(&pool, color).unwrap().color, color);
            }
        }
    }

    #[test]
    fn test_pick_uses_scripted_index() {
        let pool = ChallengePool::builtin().unwrap();
        let mut selector = ChallengeSelector::new(ScriptedRandom::new().with_indices([4]));
        let entry = selector.pick(&pool, ColorSector::Blue).unwrap();
        assert_eq!(entry.id, 25);
    }

    #[test]
    fn test_pick_is_roughly_uniform() {
        let pool = ChallengePool::builtin().unwrap();
        let mut selector = ChallengeSelector::new(RngSource::seeded(2024));
        let bucket = pool.entries_for(ColorSector::Yellow);
        let trials = 20_000;
        let mut counts = vec![0usize; bucket.len()];

        for _ in 0..trials {
            let entry = selector.pick(&pool, ColorSector::Yellow).unwrap();
            let slot = bucket.iter().position(|e| e.id == entry.id).unwrap();
            counts[slot] += 1;
        }

        let expected = trials / bucket.len();
        for (slot, &count) in counts.iter().enumerate() {
            assert!(
                count > expected * 7 / 10 && count < expected * 13 / 10,
                "slot {} drew {} times, expected about {}",
                slot,
                count,
                expected
            );
        }
    }

    #[test]
    fn test_pick_for_angle_and_any() {
        let pool = ChallengePool::builtin().unwrap();
        let mut selector = ChallengeSelector::new(RngSource::seeded(9));
        assert_eq!(
            selector.pick_for_angle(&pool, -10.0).unwrap().color,
            ColorSector::Yellow
        );
        assert_eq!(
            selector.pick_for_angle(&pool, 780.0).unwrap().color,
            ColorSector::Red
        );
        let any = selector.pick_any(&pool).unwrap();
        assert!(pool.get(any.id).is_some());
    }
}
