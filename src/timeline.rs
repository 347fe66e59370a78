use crate::constants::*;
use crate::*;
use serde::Serialize;
use std::collections::HashMap;

/// Folds an event's in-period time and period into a single match clock.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalClock {
    offsets: Vec<f64>,
}

impl GlobalClock {
    pub fn new(config: &PeriodConfig) -> Self {
        Self {
            offsets: config.offsets.clone(),
        }
    }

    /// The period an event belongs to; anything missing or unconfigured is
    /// treated as the first period.
    pub fn resolve_period(&self, period: Option<u8>) -> u8 {
        match period {
            Some(p) if p >= 1 && (p as usize) <= self.offsets.len() => p,
            other => {
                log::warn!(
                    "Unknown period {:?}, defaulting to {}",
                    other,
                    DEFAULT_PERIOD
                );
                DEFAULT_PERIOD
            }
        }
    }

    pub fn period_offset(&self, period: u8) -> f64 {
        self.offsets
            .get((period as usize).saturating_sub(1))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn global_time(&self, period: u8, local_time: f64) -> f64 {
        self.period_offset(period) + local_time.max(0.0)
    }
}

/// An event placed on the global clock.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub global_time: f64,
    pub period: u8,
    /// Position of the event in the log as delivered by the loader.
    pub log_index: usize,
    pub event: MatchEvent,
}

/// The event log in playback order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventSchedule {
    events: Vec<ScheduledEvent>,
}

impl EventSchedule {
    /// Place every event on the global clock. Events whose period runs
    /// backwards relative to the log so far are dropped; the remainder is
    /// stably sorted by global time.
    pub fn new(events: &[MatchEvent], clock: &GlobalClock) -> Self {
        let mut highest_period = 0u8;
        let mut scheduled = Vec::with_capacity(events.len());
        for (log_index, event) in events.iter().enumerate() {
            let period = clock.resolve_period(event.period);
            if period < highest_period {
                log::warn!(
                    "Dropping event {} ({:?}): period {} after period {}",
                    log_index,
                    event.kind,
                    period,
                    highest_period
                );
                continue;
            }
            highest_period = period;
            scheduled.push(ScheduledEvent {
                global_time: clock.global_time(period, event.time),
                period,
                log_index,
                event: event.clone(),
            });
        }
        scheduled.sort_by(|a, b| a.global_time.total_cmp(&b.global_time));
        Self { events: scheduled }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScheduledEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.events.iter()
    }

    /// Global time of the final event, or zero for an empty log.
    pub fn end_time(&self) -> f64 {
        self.events.last().map(|e| e.global_time).unwrap_or(0.0)
    }

    /// Index of the first event strictly after `time`.
    pub fn first_after(&self, time: f64) -> usize {
        self.events.partition_point(|e| e.global_time <= time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, new)]
pub struct Sample {
    pub time: f64,
    pub x: f32,
    pub y: f32,
}

impl Sample {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Observed positions for one entity, ordered by time.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SampleTimeline {
    samples: Vec<Sample>,
}

impl SampleTimeline {
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn bracket(&self, time: f64) -> Bracket<'_, Sample> {
        find_bracket(&self.samples, time, |sample| sample.time)
    }
}

/// Immutable per-entity sample timelines for a whole match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timelines {
    players: HashMap<EntityId, SampleTimeline>,
    ball: SampleTimeline,
}

impl Timelines {
    pub fn player(&self, id: &EntityId) -> Option<&SampleTimeline> {
        self.players.get(id)
    }

    pub fn ball(&self) -> &SampleTimeline {
        &self.ball
    }

    pub fn iter_players(&self) -> impl Iterator<Item = (&EntityId, &SampleTimeline)> {
        self.players.iter()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

/// Collects samples from the schedule into [`Timelines`].
pub struct TimelineBuilder {
    players: HashMap<EntityId, Vec<Sample>>,
    ball: Vec<Sample>,
}

impl TimelineBuilder {
    /// Every rostered player gets a (possibly empty) timeline, and the ball
    /// starts on the centre spot before kickoff.
    pub fn new(registry: &EntityRegistry) -> Self {
        let center = registry.pitch().center();
        Self {
            players: registry
                .iter()
                .map(|info| (info.id.clone(), Vec::new()))
                .collect(),
            ball: vec![Sample::new(0.0, center.x, center.y)],
        }
    }

    pub fn add_event(&mut self, scheduled: &ScheduledEvent) {
        let time = scheduled.global_time;
        let event = &scheduled.event;
        if let Some(freeze_frame) = &event.freeze_frame {
            for entry in freeze_frame.iter() {
                self.add_player_sample(&entry.player, time, entry.location);
            }
        }
        if let Some(location) = event.coordinates {
            if let Some(player) = &event.player {
                self.add_player_sample(player, time, location);
            }
            self.ball.push(Sample::new(time, location.x, location.y));
        }
    }

    fn add_player_sample(&mut self, id: &EntityId, time: f64, location: Point) {
        self.players
            .entry(id.clone())
            .or_default()
            .push(Sample::new(time, location.x, location.y));
    }

    pub fn build(self) -> Timelines {
        Timelines {
            players: self
                .players
                .into_iter()
                .map(|(id, samples)| (id, SampleTimeline::from_samples(samples)))
                .collect(),
            ball: SampleTimeline::from_samples(self.ball),
        }
    }

    pub fn build_from_schedule(registry: &EntityRegistry, schedule: &EventSchedule) -> Timelines {
        let mut builder = Self::new(registry);
        for scheduled in schedule.iter() {
            builder.add_event(scheduled);
        }
        let timelines = builder.build();
        log::debug!(
            "Built timelines for {} players, {} ball samples",
            timelines.player_count(),
            timelines.ball().len()
        );
        timelines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_offsets_fold_into_global_time() {
        let clock = GlobalClock::new(&PeriodConfig::default());
        assert_eq!(clock.global_time(1, 30.0), 30.0);
        assert_eq!(clock.global_time(2, 30.0), 2730.0);
        assert_eq!(clock.global_time(3, 0.0), 5400.0);
        assert_eq!(clock.global_time(4, 0.0), 6300.0);
        assert_eq!(clock.global_time(5, 0.0), 7200.0);
        assert_eq!(clock.resolve_period(Some(9)), 1);
        assert_eq!(clock.resolve_period(None), 1);
    }

    #[test]
    fn test_out_of_order_periods_are_dropped() {
        let clock = GlobalClock::new(&PeriodConfig::default());
        let events = vec![
            MatchEvent::new(10.0, 1, EventKind::Pass),
            MatchEvent::new(5.0, 2, EventKind::Pass),
            MatchEvent::new(20.0, 1, EventKind::Pass),
            MatchEvent::new(15.0, 2, EventKind::Pass),
        ];
        let schedule = EventSchedule::new(&events, &clock);
        let indices: Vec<_> = schedule.iter().map(|e| e.log_index).collect();
        assert_eq!(indices, vec![0, 1, 3]);
        assert_eq!(schedule.end_time(), 2715.0);
        assert_eq!(schedule.first_after(2705.0), 2);
        assert_eq!(schedule.first_after(0.0), 0);
    }

    #[test]
    fn test_same_time_samples_keep_arrival_order() {
        let timeline = SampleTimeline::from_samples(vec![
            Sample::new(2.0, 1.0, 1.0),
            Sample::new(1.0, 0.0, 0.0),
            Sample::new(2.0, 2.0, 2.0),
        ]);
        let xs: Vec<_> = timeline.samples().iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }
}
