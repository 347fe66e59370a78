use crate::constants::*;
use crate::*;
use serde::{Deserialize, Serialize};

/// Everything tunable about a replay session. Every section falls back to its
/// defaults, so a config document only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub pitch: PitchConfig,
    pub periods: PeriodConfig,
    pub interpolation: InterpolationConfig,
    pub tactical: TacticalConfig,
    pub playback: PlaybackConfig,
    pub history: HistoryConfig,
    pub normalization: NormalizationConfig,
}

impl ReplayConfig {
    pub fn from_json_str(json: &str) -> MatchReplayResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make playback meaningless or make the
    /// clamping helpers panic.
    pub fn validate(&self) -> MatchReplayResult<()> {
        let pitch = &self.pitch;
        require(
            positive(f64::from(pitch.length)) && positive(f64::from(pitch.width)),
            || format!("pitch must be positive, got {} x {}", pitch.length, pitch.width),
        )?;

        let offsets = &self.periods.offsets;
        require(!offsets.is_empty(), || "at least one period offset is required".to_string())?;
        require(
            offsets.iter().all(|o| o.is_finite())
                && offsets.windows(2).all(|pair| pair[0] <= pair[1]),
            || format!("period offsets must be finite and non-decreasing, got {:?}", offsets),
        )?;

        let interpolation = &self.interpolation;
        require(
            non_negative(interpolation.stale_threshold) && non_negative(interpolation.ease_max_gap),
            || {
                format!(
                    "interpolation thresholds must be non-negative, got stale {} and ease gap {}",
                    interpolation.stale_threshold, interpolation.ease_max_gap
                )
            },
        )?;
        require(
            (0.0..=0.5).contains(&interpolation.blend_fraction),
            || format!("blend fraction must lie in [0, 0.5], got {}", interpolation.blend_fraction),
        )?;

        let tactical = &self.tactical;
        require(
            [
                tactical.follow_factor,
                tactical.lateral_follow,
                tactical.goalkeeper_damping,
                tactical.jitter_amplitude,
                tactical.jitter_frequency_x,
                tactical.jitter_frequency_y,
            ]
            .iter()
            .all(|v| v.is_finite()),
            || "tactical parameters must be finite".to_string(),
        )?;

        let playback = &self.playback;
        require(
            positive(playback.min_speed)
                && playback.max_speed.is_finite()
                && playback.min_speed <= playback.max_speed,
            || {
                format!(
                    "playback speed bounds must satisfy 0 < min <= max, got [{}, {}]",
                    playback.min_speed, playback.max_speed
                )
            },
        )?;

        require(non_negative(self.history.interval), || {
            format!("history interval must be non-negative, got {}", self.history.interval)
        })?;

        let normalization = &self.normalization;
        require(
            positive(normalization.time_scale) && positive(f64::from(normalization.position_scale)),
            || {
                format!(
                    "normalization scales must be positive, got time {} and position {}",
                    normalization.time_scale, normalization.position_scale
                )
            },
        )
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn require<F: FnOnce() -> String>(condition: bool, reason: F) -> MatchReplayResult<()> {
    if condition {
        Ok(())
    } else {
        MatchReplayError::new_result(MatchReplayErrorVariant::InvalidConfig { reason: reason() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    pub length: f32,
    pub width: f32,
}

impl PitchConfig {
    pub fn center(&self) -> Point {
        Point::new(self.length / 2.0, self.width / 2.0)
    }

    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.max(0.0).min(self.length),
            point.y.max(0.0).min(self.width),
        )
    }
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            length: PITCH_LENGTH,
            width: PITCH_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodConfig {
    /// Start of each period on the global clock, indexed by `period - 1`.
    pub offsets: Vec<f64>,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            offsets: PERIOD_OFFSETS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Seconds after the last sample before an entity starts drifting back to
    /// its tactical position. The drift completes at twice this value.
    pub stale_threshold: f64,
    /// Largest bracket (seconds) that is eased directly between samples.
    pub ease_max_gap: f64,
    /// Share of a large bracket spent blending out of / into the samples.
    pub blend_fraction: f32,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            stale_threshold: STALE_SAMPLE_THRESHOLD,
            ease_max_gap: EASE_MAX_GAP,
            blend_fraction: GAP_BLEND_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalConfig {
    pub follow_factor: f32,
    pub lateral_follow: f32,
    pub goalkeeper_damping: f32,
    pub jitter_amplitude: f32,
    pub jitter_frequency_x: f32,
    pub jitter_frequency_y: f32,
}

impl Default for TacticalConfig {
    fn default() -> Self {
        Self {
            follow_factor: FOLLOW_FACTOR,
            lateral_follow: LATERAL_FOLLOW,
            goalkeeper_damping: GOALKEEPER_DAMPING,
            jitter_amplitude: JITTER_AMPLITUDE,
            jitter_frequency_x: JITTER_FREQUENCY_X,
            jitter_frequency_y: JITTER_FREQUENCY_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub min_speed: f64,
    pub max_speed: f64,
    pub initial_speed: f64,
}

impl PlaybackConfig {
    /// Expects validated bounds; NaN requests fall back to the minimum.
    pub fn clamp_speed(&self, speed: f64) -> f64 {
        if speed.is_nan() {
            return self.min_speed;
        }
        speed.max(self.min_speed).min(self.max_speed)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            min_speed: MIN_PLAYBACK_SPEED,
            max_speed: MAX_PLAYBACK_SPEED,
            initial_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    pub interval: f64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
            interval: HISTORY_INTERVAL_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub time_scale: f64,
    pub position_scale: f32,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            time_scale: MATCH_DURATION_SECONDS,
            position_scale: PITCH_LENGTH,
        }
    }
}
