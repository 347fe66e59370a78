use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A location in pitch coordinates: x along the length, y across the width,
/// origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS, new)]
#[ts(export)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn lerp(&self, other: &Point, amount: f32) -> Point {
        glam_to_point(&point_to_glam(self).lerp(point_to_glam(other), amount.clamp(0.0, 1.0)))
    }

    pub fn distance(&self, other: &Point) -> f32 {
        point_to_glam(self).distance(point_to_glam(other))
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point { x, y }
    }
}

pub fn point_to_glam(p: &Point) -> glam::Vec2 {
    glam::Vec2::new(p.x, p.y)
}

pub fn glam_to_point(v: &glam::Vec2) -> Point {
    Point { x: v.x, y: v.y }
}

/// Quintic ease-in/ease-out. Maps `[0, 1]` onto `[0, 1]` with zero velocity
/// and acceleration at both ends.
pub fn ease_in_out_quint(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    if p < 0.5 {
        16.0 * p.powi(5)
    } else {
        1.0 - (-2.0 * p + 2.0).powi(5) / 2.0
    }
}

/// Fraction of the way `value` lies from `start` to `end`, clamped to `[0, 1]`.
/// An empty span counts as already complete.
pub fn progress_between(start: f64, end: f64, value: f64) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return 1.0;
    }
    ((value - start) / span).clamp(0.0, 1.0) as f32
}

/// The samples surrounding a query time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket<'a, T> {
    Empty,
    /// A sample sits exactly on the query time (the latest such sample).
    Exact(&'a T),
    /// The query precedes every sample.
    AfterOnly(&'a T),
    /// The query follows every sample.
    BeforeOnly(&'a T),
    Between(&'a T, &'a T),
}

/// Locate the latest item at or before `time` and the earliest item after it
/// in a slice sorted by `key`.
pub fn find_bracket<T, F>(items: &[T], time: f64, key: F) -> Bracket<'_, T>
where
    F: Fn(&T) -> f64,
{
    let split = items.partition_point(|item| key(item) <= time);
    let before = split.checked_sub(1).map(|index| &items[index]);
    let after = items.get(split);
    match (before, after) {
        (None, None) => Bracket::Empty,
        (Some(before), _) if key(before) == time => Bracket::Exact(before),
        (None, Some(after)) => Bracket::AfterOnly(after),
        (Some(before), None) => Bracket::BeforeOnly(before),
        (Some(before), Some(after)) => Bracket::Between(before, after),
    }
}

/// Deterministic FNV-1a hash, stable across platforms and toolchains.
pub fn stable_hash(text: &str) -> u64 {
    text.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x100000001b3)
    })
}

/// Phase in `[0, 2π)` derived from a stable hash of `text`.
pub fn stable_phase(text: &str) -> f32 {
    (stable_hash(text) % 10_000) as f32 / 10_000.0 * std::f32::consts::TAU
}
