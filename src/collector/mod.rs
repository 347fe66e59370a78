pub mod decorator;
pub mod ndarray;
pub mod replay_data;

pub use self::ndarray::*;
pub use decorator::*;
pub use replay_data::*;

use crate::*;

/// What a [`Collector`] wants the processor to do after it returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeAdvance {
    /// Advance to this global time (ignored unless it lies ahead).
    Time(f64),
    /// Advance by the processor's tick interval.
    NextTick,
}

/// A consumer of replay state, invoked once per processed tick.
pub trait Collector: Sized {
    fn process_tick(
        &mut self,
        processor: &MatchProcessor,
        tick: usize,
        current_time: f64,
    ) -> MatchReplayResult<TimeAdvance>;

    fn process_match(mut self, match_data: &MatchData) -> MatchReplayResult<Self> {
        MatchProcessor::new(match_data, ReplayConfig::default())?
            .process(&mut self, constants::DEFAULT_TICK_INTERVAL)?;
        Ok(self)
    }
}

impl<G> Collector for G
where
    G: FnMut(&MatchProcessor, usize, f64) -> MatchReplayResult<TimeAdvance>,
{
    fn process_tick(
        &mut self,
        processor: &MatchProcessor,
        tick: usize,
        current_time: f64,
    ) -> MatchReplayResult<TimeAdvance> {
        self(processor, tick, current_time)
    }
}

/// History recording as a stand-alone consumer, for callers that want a
/// differently configured tracker than the processor's own.
impl Collector for HistoryTracker {
    fn process_tick(
        &mut self,
        processor: &MatchProcessor,
        _tick: usize,
        _current_time: f64,
    ) -> MatchReplayResult<TimeAdvance> {
        self.record(processor.mirror(), false);
        Ok(TimeAdvance::NextTick)
    }
}
