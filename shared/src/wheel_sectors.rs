use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{FULL_TURN_DEGREES, SECTOR_COUNT, SECTOR_SPAN_DEGREES};

/// One of the four coloured quarters of the dial.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorSector {
    Red,
    Blue,
    Green,
    Yellow,
}

/// Everything the engine and its collaborators need to know about a sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorInfo {
    pub color: ColorSector,
    /// Inclusive lower bound, clockwise from the pointer's rest position.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
    pub name: &'static str,
    pub rgb: (u8, u8, u8),
}

/// Canonical sector table. Order is fixed and must never change: the ranges
/// partition `[0, 360)` in this sequence.
pub const SECTORS: [SectorInfo; SECTOR_COUNT] = [
    SectorInfo {
        color: ColorSector::Red,
        low: 0.0,
        high: 90.0,
        name: "RED",
        rgb: (0xFF, 0x6B, 0x6B),
    },
    SectorInfo {
        color: ColorSector::Blue,
        low: 90.0,
        high: 180.0,
        name: "BLUE",
        rgb: (0x4E, 0xCD, 0xC4),
    },
    SectorInfo {
        color: ColorSector::Green,
        low: 180.0,
        high: 270.0,
        name: "GREEN",
        rgb: (0x4C, 0xAF, 0x50),
    },
    SectorInfo {
        color: ColorSector::Yellow,
        low: 270.0,
        high: 360.0,
        name: "YELLOW",
        rgb: (0xFF, 0xE6, 0x6D),
    },
];

impl ColorSector {
    pub const ALL: [ColorSector; SECTOR_COUNT] = [
        ColorSector::Red,
        ColorSector::Blue,
        ColorSector::Green,
        ColorSector::Yellow,
    ];

    pub fn index(self) -> usize {
        match self {
            ColorSector::Red => 0,
            ColorSector::Blue => 1,
            ColorSector::Green => 2,
            ColorSector::Yellow => 3,
        }
    }

    /// Inverse of [`ColorSector::index`]; wraps out-of-range values.
    pub fn from_index(index: usize) -> Self {
        SECTORS[index % SECTOR_COUNT].color
    }

    pub fn info(self) -> &'static SectorInfo {
        &SECTORS[self.index()]
    }

    pub fn lower_bound(self) -> f64 {
        self.info().low
    }

    pub fn display_name(self) -> &'static str {
        self.info().name
    }

    /// Display colour as `#RRGGBB`.
    pub fn hex(self) -> String {
        let (r, g, b) = self.info().rgb;
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl fmt::Display for ColorSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Folds any angle into `[0, 360)`. Non-finite input folds to `0.0`.
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let n = degrees.rem_euclid(FULL_TURN_DEGREES);
    // rem_euclid can round tiny negatives up to exactly 360.0
    if n >= FULL_TURN_DEGREES {
        0.0
    } else {
        n
    }
}

/// Maps a rotation angle to the sector under the pointer.
///
/// Sector ranges are half-open `[low, high)`: an angle sitting exactly on a
/// boundary belongs to the sector that starts there.
pub fn sector_of(degrees: f64) -> ColorSector {
    let n = normalize_angle(degrees);
    let index = (n / SECTOR_SPAN_DEGREES).floor() as usize;
    ColorSector::from_index(index.min(SECTOR_COUNT - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_partitions_full_turn() {
        let mut expected_low = 0.0;
        for (i, sector) in SECTORS.iter().enumerate() {
            assert_eq!(sector.low, expected_low);
            assert_eq!(sector.high - sector.low, SECTOR_SPAN_DEGREES);
            assert_eq!(sector.color.index(), i);
            expected_low = sector.high;
        }
        assert_eq!(expected_low, FULL_TURN_DEGREES);
    }

    #[test]
    fn test_boundaries_belong_to_next_sector() {
        assert_eq!(sector_of(0.0), ColorSector::Red);
        assert_eq!(sector_of(90.0), ColorSector::Blue);
        assert_eq!(sector_of(180.0), ColorSector::Green);
        assert_eq!(sector_of(270.0), ColorSector::Yellow);
        assert_eq!(sector_of(360.0), ColorSector::Red);
        assert_eq!(sector_of(89.999_999), ColorSector::Red);
    }

    #[test]
    fn test_negative_angles_fold_forward() {
        assert_eq!(normalize_angle(-10.0), 350.0);
        assert_eq!(sector_of(-10.0), ColorSector::Yellow);
        assert_eq!(sector_of(-90.0), ColorSector::Yellow);
        assert_eq!(sector_of(-90.5), ColorSector::Green);
    }

    #[test]
    fn test_sector_is_periodic() {
        let samples = [0.0, 12.5, 89.9, 90.0, 135.0, 180.0, 269.99, 270.0, 359.5];
        for &a in &samples {
            for k in -5..=5 {
                let shifted = a + FULL_TURN_DEGREES * k as f64;
                assert_eq!(sector_of(a), sector_of(shifted), "angle {} turn {}", a, k);
            }
        }
    }

    #[test]
    fn test_large_drag_angle() {
        assert_eq!(sector_of(780.0), ColorSector::Red);
        assert_eq!(sector_of(780.0), sector_of(60.0));
        assert_eq!(sector_of(1305.0), ColorSector::Green);
    }

    #[test]
    fn test_tiny_negative_does_not_escape_range() {
        let n = normalize_angle(-1e-20);
        assert!((0.0..FULL_TURN_DEGREES).contains(&n));
        assert_eq!(sector_of(-1e-20), ColorSector::Red);
    }

    #[test]
    fn test_non_finite_angles_are_total() {
        assert_eq!(sector_of(f64::NAN), ColorSector::Red);
        assert_eq!(sector_of(f64::INFINITY), ColorSector::Red);
    }

    #[test]
    fn test_display_lookup() {
        assert_eq!(ColorSector::Green.to_string(), "GREEN");
        assert_eq!(ColorSector::Red.hex(), "#FF6B6B");
        assert_eq!(ColorSector::Yellow.lower_bound(), 270.0);
        assert_eq!(ColorSector::from_index(5), ColorSector::Blue);
    }
}
