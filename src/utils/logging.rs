use log::{log_enabled, warn, Level};
use std::time::{Duration, Instant};

/// Scoped timer logging the duration of a simulation phase at trace level.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            let elapsed = self.start.elapsed();
            log::trace!("{} took {} µs", self.label, elapsed.as_micros());
        }
    }
}

/// Warns when a tick blows past the host's frame budget.
pub fn warn_if_tick_budget_exceeded(duration: Duration, budget_ms: f32) {
    let elapsed_ms = duration.as_secs_f32() * 1000.0;
    if elapsed_ms > budget_ms {
        warn!("tick exceeded budget: {elapsed_ms:.2} ms > {budget_ms:.2} ms");
    }
}
