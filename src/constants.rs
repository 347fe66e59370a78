pub static PITCH_LENGTH: f32 = 120.0;
pub static PITCH_WIDTH: f32 = 80.0;

/// Offsets (seconds) folded into in-period timestamps, indexed by `period - 1`.
/// Periods 3 and 4 are extra time, period 5 is the shootout.
pub static PERIOD_OFFSETS: [f64; 5] = [0.0, 45.0 * 60.0, 90.0 * 60.0, 105.0 * 60.0, 120.0 * 60.0];

pub static DEFAULT_PERIOD: u8 = 1;

pub static MATCH_DURATION_SECONDS: f64 = 90.0 * 60.0;

pub static STALE_SAMPLE_THRESHOLD: f64 = 5.0;
pub static EASE_MAX_GAP: f64 = 10.0;
pub static GAP_BLEND_FRACTION: f32 = 0.2;

pub static FOLLOW_FACTOR: f32 = 0.6;
pub static LATERAL_FOLLOW: f32 = 0.3;
pub static GOALKEEPER_DAMPING: f32 = 0.25;
pub static JITTER_AMPLITUDE: f32 = 1.2;
pub static JITTER_FREQUENCY_X: f32 = 0.45;
pub static JITTER_FREQUENCY_Y: f32 = 0.31;

pub static MIN_PLAYBACK_SPEED: f64 = 0.1;
pub static MAX_PLAYBACK_SPEED: f64 = 10.0;

pub static DEFAULT_TICK_INTERVAL: f64 = 1.0 / 60.0;

pub static HISTORY_CAPACITY: usize = 1000;
pub static HISTORY_INTERVAL_SECONDS: f64 = 1.0;

pub static INITIAL_STAMINA: f32 = 1.0;

/// Width of the fixed header at the front of every feature vector:
/// time, period, home score, away score, possession.
pub static FEATURE_HEADER_LEN: usize = 5;

// Players who are not on the pitch yet are placed far outside it so that a
// model built on the exported arrays can tell them apart from real positions.
pub static OFF_PITCH_SENTINEL: f32 = 200000.0;

/// 4-3-3 base slots for a side attacking towards increasing x.
pub static GOALKEEPER_SLOTS: [(f32, f32); 1] = [(5.0, 40.0)];
pub static DEFENDER_SLOTS: [(f32, f32); 4] = [(25.0, 10.0), (25.0, 30.0), (25.0, 50.0), (25.0, 70.0)];
pub static MIDFIELDER_SLOTS: [(f32, f32); 3] = [(45.0, 20.0), (45.0, 40.0), (45.0, 60.0)];
pub static FORWARD_SLOTS: [(f32, f32); 3] = [(65.0, 15.0), (65.0, 40.0), (65.0, 65.0)];

pub static LAYOUT_OVERFLOW_SHIFT: f32 = 6.0;
pub static LAYOUT_COLLISION_STEP: f32 = 4.0;
