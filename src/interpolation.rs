use crate::*;
use std::sync::Arc;

/// Answers "where is this entity at time t" from the sparse sample timelines,
/// synthesizing formation-based positions wherever observations are missing
/// or too far apart.
#[derive(Debug, Clone)]
pub struct Interpolator {
    timelines: Arc<Timelines>,
    registry: Arc<EntityRegistry>,
    interpolation: InterpolationConfig,
    tactical: TacticalConfig,
    pitch: PitchConfig,
}

impl Interpolator {
    pub fn new(
        timelines: Arc<Timelines>,
        registry: Arc<EntityRegistry>,
        config: &ReplayConfig,
    ) -> Self {
        Self {
            timelines,
            registry,
            interpolation: config.interpolation,
            tactical: config.tactical,
            pitch: config.pitch,
        }
    }

    pub fn timelines(&self) -> &Arc<Timelines> {
        &self.timelines
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// Position of any entity at `time`. Players missing from the roster have
    /// no known side here and yield `None`; callers that know the side from
    /// the world state use [`Interpolator::player_position_at`].
    pub fn position_at(&self, entity: &Entity, time: f64) -> Option<Point> {
        let ball = self.ball_position_at(time);
        match entity {
            Entity::Ball => Some(ball),
            Entity::Player(id) => {
                let side = self.registry.info(id)?.side;
                Some(self.player_position_at(id, side, time, ball))
            }
        }
    }

    /// The ball eases between consecutive samples regardless of the gap and
    /// holds its last known position once the log runs out.
    pub fn ball_position_at(&self, time: f64) -> Point {
        match self.timelines.ball().bracket(time) {
            Bracket::Empty => self.pitch.center(),
            Bracket::Exact(sample) | Bracket::AfterOnly(sample) | Bracket::BeforeOnly(sample) => {
                sample.point()
            }
            Bracket::Between(before, after) => eased_between(before, after, time),
        }
    }

    /// Position of player `id` at `time`, given where the ball is at that
    /// moment (the ball drives the tactical fallback).
    pub fn player_position_at(&self, id: &EntityId, side: TeamSide, time: f64, ball: Point) -> Point {
        let info = self.registry.resolve(id, side);
        let tactical = || self.tactical_position(&info, ball, time);
        let timeline = match self.timelines.player(id) {
            Some(timeline) => timeline,
            None => return tactical(),
        };
        let config = &self.interpolation;

        match timeline.bracket(time) {
            Bracket::Empty => tactical(),
            Bracket::Exact(sample) | Bracket::AfterOnly(sample) => sample.point(),
            Bracket::BeforeOnly(before) => {
                let elapsed = time - before.time;
                if elapsed <= config.stale_threshold {
                    before.point()
                } else {
                    let weight = progress_between(
                        config.stale_threshold,
                        2.0 * config.stale_threshold,
                        elapsed,
                    );
                    before.point().lerp(&tactical(), weight)
                }
            }
            Bracket::Between(before, after) => {
                let gap = after.time - before.time;
                if gap <= 0.0 {
                    before.point()
                } else if gap <= config.ease_max_gap {
                    eased_between(before, after, time)
                } else {
                    self.bridge_gap(before, after, time, tactical())
                }
            }
        }
    }

    /// Sparse-data regime: leave the earlier sample for the tactical position
    /// over the first part of the gap, hold it, then converge on the later
    /// sample over the final part.
    fn bridge_gap(&self, before: &Sample, after: &Sample, time: f64, tactical: Point) -> Point {
        let fraction = f64::from(self.interpolation.blend_fraction.clamp(0.0, 0.5));
        let progress = f64::from(progress_between(before.time, after.time, time));
        if fraction <= 0.0 {
            return tactical;
        }
        if progress < fraction {
            before
                .point()
                .lerp(&tactical, progress_between(0.0, fraction, progress))
        } else if progress > 1.0 - fraction {
            tactical.lerp(
                &after.point(),
                progress_between(1.0 - fraction, 1.0, progress),
            )
        } else {
            tactical
        }
    }

    /// Formation base shifted with the ball, plus a gentle per-player sway.
    /// Pure in its inputs.
    pub fn tactical_position(&self, info: &EntityInfo, ball: Point, time: f64) -> Point {
        let config = &self.tactical;
        let center = self.pitch.center();
        let damping = if info.role == Role::Goalkeeper {
            config.goalkeeper_damping
        } else {
            1.0
        };
        let shift_x = (ball.x - center.x) * config.follow_factor * damping;
        let shift_y = (ball.y - center.y) * config.lateral_follow * damping;

        let phase = f64::from(stable_phase(info.id.as_str()));
        let sway = |frequency: f32, phase: f64| {
            config.jitter_amplitude * (time * f64::from(frequency) + phase).sin() as f32
        };
        let jitter_x = sway(config.jitter_frequency_x, phase);
        let jitter_y = sway(config.jitter_frequency_y, phase * 1.7);

        self.pitch.clamp(Point::new(
            info.base.x + shift_x + jitter_x,
            info.base.y + shift_y + jitter_y,
        ))
    }
}

fn eased_between(before: &Sample, after: &Sample, time: f64) -> Point {
    let progress = progress_between(before.time, after.time, time);
    before
        .point()
        .lerp(&after.point(), ease_in_out_quint(progress))
}
