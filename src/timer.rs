//! Timing helpers for the frame loops.

use std::{
    collections::VecDeque,
    fmt,
    time::{Duration, Instant},
};

/// Only the most recent measurements are kept.
const WINDOW: usize = 256;

/// Measures how long an operation takes, averaged over recent invocations.
///
/// Displaying the timer with `{}` prints the average over the current window.
pub struct Timer {
    name: &'static str,
    samples: VecDeque<Duration>,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            samples: VecDeque::with_capacity(WINDOW),
        }
    }

    /// Runs `f` and records its duration.
    pub fn time<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        f()
    }

    /// Starts a measurement that ends when the returned guard is dropped.
    pub fn start(&mut self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    fn record(&mut self, duration: Duration) {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(duration);
    }

    /// Returns the number of recorded measurements.
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Returns the mean of the recorded measurements, or `None` if there are none.
    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.average() {
            Some(avg) => write!(
                f,
                "{}: {}x{:.01}ms",
                self.name,
                self.count(),
                avg.as_secs_f32() * 1000.0
            ),
            None => write!(f, "{}: -", self.name),
        }
    }
}

/// Returned by [`Timer::start`].
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a mut Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.timer.record(elapsed);
    }
}

/// Counts processed frames and logs the rate once per second.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Counts a frame. Once per second, logs the frame rate and the averages of `timers`.
    pub fn tick_with<'a, I>(&mut self, timers: I)
    where
        I: IntoIterator<Item = &'a Timer>,
    {
        self.frames += 1;
        if self.start.elapsed() < Duration::from_secs(1) {
            return;
        }

        let extra = timers.into_iter().map(|t| t.to_string()).collect::<Vec<_>>();
        if extra.is_empty() {
            log::debug!("{}: {} FPS", self.name, self.frames);
        } else {
            log::debug!("{}: {} FPS ({})", self.name, self.frames, extra.join(", "));
        }

        self.frames = 0;
        self.start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_recent_measurements() {
        let mut timer = Timer::new("test");
        assert_eq!(timer.average(), None);
        assert_eq!(timer.to_string(), "test: -");

        for _ in 0..3 {
            timer.record(Duration::from_millis(10));
        }
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.count(), 4);
        assert_eq!(timer.average(), Some(Duration::from_millis(15)));
        assert_eq!(timer.to_string(), "test: 4x15.0ms");
    }

    #[test]
    fn window_is_bounded() {
        let mut timer = Timer::new("bounded");
        for _ in 0..WINDOW + 10 {
            timer.time(|| ());
        }
        assert_eq!(timer.count(), WINDOW);
    }
}
