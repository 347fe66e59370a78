use crate::*;

/// Samples an inner collector at a fixed rate, steering the processor
/// straight to the next sample time.
pub struct FrameRateDecorator<'a, C> {
    collector: &'a mut C,
    interval: f64,
    next_sample: f64,
    samples_taken: usize,
}

impl<'a, C: Collector> FrameRateDecorator<'a, C> {
    pub fn new_from_fps(fps: f64, collector: &'a mut C) -> Self {
        Self::new(1.0 / fps, collector)
    }

    pub fn new(interval: f64, collector: &'a mut C) -> Self {
        Self {
            collector,
            interval,
            next_sample: 0.0,
            samples_taken: 0,
        }
    }

    pub fn samples_taken(&self) -> usize {
        self.samples_taken
    }
}

impl<'a, C: Collector> Collector for FrameRateDecorator<'a, C> {
    fn process_tick(
        &mut self,
        processor: &MatchProcessor,
        _tick: usize,
        current_time: f64,
    ) -> MatchReplayResult<TimeAdvance> {
        if current_time >= self.next_sample {
            self.collector
                .process_tick(processor, self.samples_taken, current_time)?;
            self.samples_taken += 1;
            self.next_sample += self.interval;
            if self.next_sample <= current_time {
                self.next_sample = current_time + self.interval;
            }
        }
        Ok(TimeAdvance::Time(self.next_sample))
    }
}
