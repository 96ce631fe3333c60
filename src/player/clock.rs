use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Shared playback clock, advanced by the audio output as it consumes
/// samples. The audio position is the master clock; video frames are
/// scheduled against it.
///
/// Position is stored as a count of raw interleaved samples, so the clock
/// automatically tracks rate changes: when the sink resamples at 2x, it
/// drains the source twice as fast and the clock advances twice as fast.
#[derive(Clone)]
pub struct PlaybackClock {
    shared: Arc<ClockShared>,
    sample_rate: u32,
    channels: u16,
}

struct ClockShared {
    /// Raw interleaved samples consumed since t = 0.
    samples: AtomicU64,
    running: AtomicBool,
    /// Set on seek; the audio source drops buffered samples when it sees it.
    flush: AtomicBool,
}

impl PlaybackClock {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            shared: Arc::new(ClockShared {
                samples: AtomicU64::new(0),
                running: AtomicBool::new(false),
                flush: AtomicBool::new(false),
            }),
            sample_rate,
            channels,
        }
    }

    fn samples_per_second(&self) -> f64 {
        f64::from(self.sample_rate) * f64::from(self.channels)
    }

    /// Current position in seconds.
    pub fn seconds(&self) -> f64 {
        self.shared.samples.load(Ordering::Relaxed) as f64 / self.samples_per_second()
    }

    /// Reposition the clock (seek) and request an audio buffer flush.
    pub fn set_seconds(&self, seconds: f64) {
        let samples = (seconds.max(0.0) * self.samples_per_second()) as u64;
        self.shared.samples.store(samples, Ordering::Relaxed);
        self.shared.flush.store(true, Ordering::Relaxed);
    }

    /// Consume a pending flush request. Returns true at most once per seek.
    pub fn take_flush(&self) -> bool {
        self.shared.flush.swap(false, Ordering::Relaxed)
    }

    /// Advance by a number of raw samples consumed, unless held.
    pub fn advance(&self, samples: u64) {
        if self.shared.running.load(Ordering::Relaxed) {
            self.shared.samples.fetch_add(samples, Ordering::Relaxed);
        }
    }

    pub fn run(&self) {
        self.shared.running.store(true, Ordering::Relaxed);
    }

    pub fn hold(&self) {
        self.shared.running.store(false, Ordering::Relaxed);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_while_running() {
        let clock = PlaybackClock::new(48_000, 2);
        clock.advance(96_000);
        assert_eq!(clock.seconds(), 0.0);

        clock.run();
        clock.advance(96_000);
        assert!((clock.seconds() - 1.0).abs() < 1e-9);

        clock.hold();
        clock.advance(96_000);
        assert!((clock.seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn seek_repositions_and_requests_flush() {
        let clock = PlaybackClock::new(44_100, 2);
        clock.set_seconds(12.5);
        assert!((clock.seconds() - 12.5).abs() < 1e-4);
        assert!(clock.take_flush());
        assert!(!clock.take_flush());
    }
}
