//! Fixed-cadence tick scheduling.
//!
//! Hosts redraw whenever they like; the engines advance in whole ticks. A
//! [`FrameClock`] accumulates elapsed wall time and reports how many ticks
//! are due at its configured rate, carrying the remainder over to the next
//! call.
//!
//! # Example
//!
//! ```ignore
//! use genefield::clock::FrameClock;
//!
//! let mut clock = FrameClock::new(30.0);
//!
//! // In your redraw callback:
//! for _ in 0..clock.update() {
//!     driver.tick();
//! }
//! ```

use std::time::{Duration, Instant};

/// Upper bound on ticks reported by a single update, so a long stall does
/// not trigger a burst of catch-up work.
const MAX_TICKS_PER_UPDATE: u32 = 8;

/// Converts elapsed time into a whole number of due ticks.
#[derive(Debug)]
pub struct FrameClock {
    /// Seconds per tick.
    interval: f64,
    /// When `update` was last called.
    last_update: Instant,
    /// Scaled time not yet consumed by a tick.
    accumulator: f64,
    /// Total ticks reported so far.
    tick_count: u64,
    /// Whether time is paused.
    paused: bool,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f64,
}

impl FrameClock {
    /// Create a clock ticking `rate` times per second, starting now.
    ///
    /// A non-positive or non-finite rate falls back to 60.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 60.0 };
        Self {
            interval: 1.0 / rate,
            last_update: Instant::now(),
            accumulator: 0.0,
            tick_count: 0,
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Ticks due since the previous call, measured against the wall clock.
    pub fn update(&mut self) -> u32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update);
        self.last_update = now;
        self.advance(elapsed)
    }

    /// Ticks due after `elapsed` more time has passed.
    ///
    /// Deterministic counterpart of [`update`](Self::update).
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.paused {
            return 0;
        }
        self.accumulator += elapsed.as_secs_f64() * self.time_scale;

        let due = (self.accumulator / self.interval).floor();
        let ticks = if due >= MAX_TICKS_PER_UPDATE as f64 {
            self.accumulator = 0.0;
            MAX_TICKS_PER_UPDATE
        } else {
            self.accumulator -= due * self.interval;
            due as u32
        };

        self.tick_count += ticks as u64;
        ticks
    }

    /// Time until the next tick is due, at the current time scale.
    pub fn until_next(&self) -> Duration {
        let remaining = (self.interval - self.accumulator).max(0.0);
        if self.time_scale > 0.0 {
            Duration::try_from_secs_f64(remaining / self.time_scale).unwrap_or(Duration::MAX)
        } else {
            Duration::from_secs_f64(self.interval)
        }
    }

    /// Total ticks reported since creation or the last reset.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.tick_count
    }

    /// Ticks per second.
    #[inline]
    pub fn rate(&self) -> f64 {
        1.0 / self.interval
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Stop reporting ticks. Time spent paused is never made up.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after pausing.
    pub fn resume(&mut self) {
        if self.paused {
            self.last_update = Instant::now();
            self.paused = false;
        }
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.max(0.0);
    }

    /// Forget accumulated time and the tick count.
    pub fn reset(&mut self) {
        self.last_update = Instant::now();
        self.accumulator = 0.0;
        self.tick_count = 0;
        self.paused = false;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}
