use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::challenge_deck::BUILTIN_DECK;
use crate::constants::SECTOR_COUNT;
use crate::error::ConfigurationError;
use crate::wheel_sectors::ColorSector;

/// A single challenge card.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChallengeEntry {
    pub id: u32,
    pub color: ColorSector,
    pub category: String,
    #[serde(alias = "description")]
    pub text: String,
}

impl ChallengeEntry {
    pub fn new(
        id: u32,
        color: ColorSector,
        category: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            color,
            category: category.into(),
            text: text.into(),
        }
    }
}

/// Immutable challenge store, one non-empty bucket per sector.
///
/// Built once and never mutated, so an `Arc<ChallengePool>` can be shared by
/// any number of game instances without locking.
#[derive(Debug, Clone)]
pub struct ChallengePool {
    buckets: [Vec<ChallengeEntry>; SECTOR_COUNT],
}

impl ChallengePool {
    /// Groups entries by their declared colour, keeping input order within
    /// each bucket.
    pub fn load(
        entries: impl IntoIterator<Item = ChallengeEntry>,
    ) -> Result<Self, ConfigurationError> {
        let mut buckets: [Vec<ChallengeEntry>; SECTOR_COUNT] = Default::default();
        let mut seen = HashSet::new();

        for entry in entries {
            if !seen.insert(entry.id) {
                return Err(ConfigurationError::DuplicateId(entry.id));
            }
            buckets[entry.color.index()].push(entry);
        }

        Self::from_validated_buckets(buckets)
    }

    /// Builds a pool from explicit colour buckets. Every entry must declare
    /// the colour of the bucket it is filed under.
    pub fn from_buckets(
        groups: impl IntoIterator<Item = (ColorSector, Vec<ChallengeEntry>)>,
    ) -> Result<Self, ConfigurationError> {
        let mut buckets: [Vec<ChallengeEntry>; SECTOR_COUNT] = Default::default();
        let mut seen = HashSet::new();

        for (bucket, entries) in groups {
            for entry in entries {
                if entry.color != bucket {
                    return Err(ConfigurationError::MismatchedColor {
                        id: entry.id,
                        bucket,
                        declared: entry.color,
                    });
                }
                if !seen.insert(entry.id) {
                    return Err(ConfigurationError::DuplicateId(entry.id));
                }
                buckets[bucket.index()].push(entry);
            }
        }

        Self::from_validated_buckets(buckets)
    }

    /// The stock 80-card deck.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::load(BUILTIN_DECK.iter().cloned())
    }

    fn from_validated_buckets(
        buckets: [Vec<ChallengeEntry>; SECTOR_COUNT],
    ) -> Result<Self, ConfigurationError> {
        if let Some(color) = ColorSector::ALL
            .into_iter()
            .find(|c| buckets[c.index()].is_empty())
        {
            return Err(ConfigurationError::EmptySector(color));
        }

        log::debug!(
            "challenge pool loaded: red={} blue={} green={} yellow={}",
            buckets[0].len(),
            buckets[1].len(),
            buckets[2].len(),
            buckets[3].len()
        );

        Ok(Self { buckets })
    }

    /// Entries for one colour. Never empty.
    pub fn entries_for(&self, color: ColorSector) -> &[ChallengeEntry] {
        &self.buckets[color.index()]
    }

    pub fn get(&self, id: u32) -> Option<&ChallengeEntry> {
        self.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChallengeEntry> {
        self.buckets.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
