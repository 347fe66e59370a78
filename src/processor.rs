use crate::*;
use std::sync::Arc;

/// Drives a match replay: owns the live [`WorldState`], its [`StateMirror`]
/// and history, and advances them through the event schedule either tick by
/// tick or by seeking.
///
/// The schedule, registry and sample timelines are immutable once built and
/// shared behind [`Arc`]s, so readers may hold on to them freely. Everything
/// mutable is private to the processor; [`MatchProcessor::fork`] is the way to
/// get an independent world/mirror pair.
#[derive(Debug, Clone)]
pub struct MatchProcessor {
    config: ReplayConfig,
    schedule: Arc<EventSchedule>,
    interpolator: Interpolator,
    world: WorldState,
    mirror: StateMirror,
    history: HistoryTracker,
    current_time: f64,
    cursor: usize,
    speed: f64,
}

impl MatchProcessor {
    pub fn new(match_data: &MatchData, config: ReplayConfig) -> MatchReplayResult<Self> {
        config.validate()?;
        let registry = Arc::new(EntityRegistry::new(&match_data.roster, &config.pitch)?);
        let clock = GlobalClock::new(&config.periods);
        let schedule = Arc::new(EventSchedule::new(&match_data.events, &clock));
        let timelines = Arc::new(TimelineBuilder::build_from_schedule(&registry, &schedule));
        let interpolator = Interpolator::new(timelines, registry.clone(), &config);

        let world = WorldState::kickoff(&registry);
        let mirror = StateMirror::from_world(&world, config.normalization);
        let mut history = HistoryTracker::from_config(&config.history);
        history.record(&mirror, true);

        log::info!(
            "Match processor ready: {} events ({} dropped), {} entities tracked, ends at {:.1}s",
            schedule.len(),
            match_data.events.len() - schedule.len(),
            registry.len(),
            schedule.end_time()
        );

        Ok(Self {
            speed: config.playback.clamp_speed(config.playback.initial_speed),
            config,
            schedule,
            interpolator,
            world,
            mirror,
            history,
            current_time: 0.0,
            cursor: 0,
        })
    }

    /// Advance playback by `dt` wall-clock seconds, scaled by the playback
    /// speed.
    pub fn tick(&mut self, dt: f64) {
        let step = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.advance_to(self.current_time + step * self.speed);
    }

    /// Move forward to `time`, applying every event due by then, then
    /// re-interpolate all positions and resync the mirror.
    pub fn advance_to(&mut self, time: f64) {
        let time = time.max(self.current_time);
        self.current_time = time;
        while let Some(scheduled) = self.schedule.get(self.cursor) {
            if scheduled.global_time > time {
                break;
            }
            self.world
                .apply_event(self.cursor, scheduled, &self.interpolator);
            self.mirror.admit_new_players(&self.world);
            self.cursor += 1;
        }
        self.update_positions();
        self.mirror.sync(&self.world);
        self.history.record(&self.mirror, false);
    }

    /// Jump to `target` (clamped to the span of the log) by rebuilding the
    /// state from kickoff and replaying every event up to it.
    pub fn seek_to(&mut self, target: f64) {
        let target = if target.is_nan() {
            0.0
        } else {
            target.clamp(0.0, self.end_time())
        };
        log::debug!("Seeking from {:.2}s to {:.2}s", self.current_time, target);

        let registry = self.interpolator.registry().clone();
        self.world = WorldState::kickoff(&registry);
        self.mirror = StateMirror::from_world(&self.world, self.config.normalization);

        self.cursor = self.schedule.first_after(target);
        for (index, scheduled) in self.schedule.iter().take(self.cursor).enumerate() {
            self.world.apply_event(index, scheduled, &self.interpolator);
            self.mirror.admit_new_players(&self.world);
        }

        self.current_time = target;
        self.update_positions();
        self.mirror.sync(&self.world);
        self.mirror.reset_velocities();

        self.history.truncate_after(target);
        self.history.record(&self.mirror, true);
    }

    /// Interpolate every tracked entity at the current time. The ball goes
    /// first since tactical positions follow it.
    fn update_positions(&mut self) {
        let time = self.current_time;
        let ball = self.interpolator.ball_position_at(time);
        self.world.ball.position = ball;
        for player in self.world.players.values_mut() {
            player.position = self
                .interpolator
                .player_position_at(&player.id, player.team, time, ball);
        }
        self.world.timestamp = time;
    }

    pub fn set_speed(&mut self, multiplier: f64) {
        self.speed = self.config.playback.clamp_speed(multiplier);
        log::debug!("Playback speed set to {:.2}x", self.speed);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// True once every event in the log has been applied.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.schedule.len()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn current_minute(&self) -> u32 {
        (self.current_time / 60.0) as u32
    }

    pub fn end_time(&self) -> f64 {
        self.schedule.end_time()
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn mirror(&self) -> &StateMirror {
        &self.mirror
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    pub fn schedule(&self) -> &Arc<EventSchedule> {
        &self.schedule
    }

    pub fn timelines(&self) -> &Arc<Timelines> {
        self.interpolator.timelines()
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        self.interpolator.registry()
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.interpolator
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn last_event(&self) -> Option<&MatchEvent> {
        self.world
            .last_event
            .and_then(|index| self.schedule.get(index))
            .map(|scheduled| &scheduled.event)
    }

    /// Position of `entity` at `time`. Players outside the roster take their
    /// side from the live world; players the world has never seen yield
    /// `None`.
    pub fn position_at(&self, entity: &Entity, time: f64) -> Option<Point> {
        if let Some(point) = self.interpolator.position_at(entity, time) {
            return Some(point);
        }
        let id = match entity {
            Entity::Player(id) => id,
            Entity::Ball => return None,
        };
        let side = self.world.players.get(id)?.team;
        let ball = self.interpolator.ball_position_at(time);
        Some(self.interpolator.player_position_at(id, side, time, ball))
    }

    /// An independent controller at the same point of playback. Immutable
    /// match data stays shared; world, mirror and history are copied.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Run the match from the current point to the end of the log in steps of
    /// `dt` seconds (ignoring playback speed), handing the processor to
    /// `collector` after every step, starting with the current state.
    pub fn process<C: Collector>(&mut self, collector: &mut C, dt: f64) -> MatchReplayResult<()> {
        if !(dt > 0.0 && dt.is_finite()) {
            return MatchReplayError::new_result(MatchReplayErrorVariant::InvalidTickInterval {
                interval: dt,
            });
        }
        let end = self.end_time();
        let mut tick = 0;
        loop {
            let advance = collector.process_tick(self, tick, self.current_time)?;
            if self.is_finished() && self.current_time >= end {
                break;
            }
            let next = match advance {
                TimeAdvance::Time(time) if time > self.current_time => time,
                _ => self.current_time + dt,
            };
            if next <= self.current_time {
                return MatchReplayError::new_result(
                    MatchReplayErrorVariant::InvalidTickInterval { interval: dt },
                );
            }
            self.advance_to(next);
            tick += 1;
        }
        Ok(())
    }
}
