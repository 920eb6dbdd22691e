// Dial geometry
pub const FULL_TURN_DEGREES: f64 = 360.0;
pub const SECTOR_SPAN_DEGREES: f64 = 90.0;
pub const SECTOR_COUNT: usize = 4;

// Keeps in-sector offsets clear of the next boundary after float rounding.
pub const SECTOR_EDGE_MARGIN: f64 = 1e-9;

// Rotation planning
pub const DEFAULT_MIN_TURNS: u32 = 3;
pub const DEFAULT_MAX_TURNS: u32 = 6;
pub const DEFAULT_MIN_SPIN_DEGREES: f64 = 1080.0;
pub const DEFAULT_MOMENTUM_FACTOR: f64 = 2.0;

// Early-commit timeline (dramatic reveal)
pub const EARLY_SPIN_DURATION_MS: u64 = 4000;
pub const REVEAL_DELAY_MS: u64 = 2500;
pub const REVEAL_SWEEP_MS: u64 = 1000;

// Late-commit timeline
pub const LATE_SPIN_DURATION_MS: u64 = 3000;

// Collaborator feedback
pub const REVEAL_PULSE_MS: u64 = 200;
pub const SPIN_START_WAVEFORM_MS: [u64; 6] = [0, 100, 50, 100, 50, 100];
