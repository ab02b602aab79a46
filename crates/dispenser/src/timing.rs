use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_POUR_DURATION: Duration = Duration::from_millis(3_000);
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(30);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    #[error("pour duration {duration:?} is shorter than one tick ({tick_interval:?})")]
    DurationShorterThanTick {
        duration: Duration,
        tick_interval: Duration,
    },
}

/// How long a pour takes and how finely it is animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PourTiming {
    duration: Duration,
    tick_interval: Duration,
    settle_delay: Duration,
}

impl Default for PourTiming {
    fn default() -> Self {
        Self {
            duration: DEFAULT_POUR_DURATION,
            tick_interval: DEFAULT_TICK_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl PourTiming {
    pub fn new(
        duration: Duration,
        tick_interval: Duration,
        settle_delay: Duration,
    ) -> Result<Self, TimingError> {
        if tick_interval.is_zero() {
            return Err(TimingError::ZeroTickInterval);
        }
        if duration < tick_interval {
            return Err(TimingError::DurationShorterThanTick {
                duration,
                tick_interval,
            });
        }
        Ok(Self {
            duration,
            tick_interval,
            settle_delay,
        })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Number of ticks in a pour (`duration / tick_interval`).
    pub fn steps(&self) -> f64 {
        self.duration.as_micros() as f64 / self.tick_interval.as_micros() as f64
    }

    /// Upper bound on how long a pour keeps the dispenser busy.
    pub fn total(&self) -> Duration {
        self.duration + self.settle_delay
    }
}
