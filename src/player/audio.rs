use rodio::Source;
use std::sync::Arc;
use std::time::Duration;

use super::audio_ring::AudioRing;
use super::clock::PlaybackClock;

/// How many consumed samples to accumulate before advancing the shared
/// clock. Keeps atomic traffic off the per-sample hot path.
const CLOCK_BATCH: u32 = 256;

/// rodio source that drains the shared ring and drives the playback clock.
///
/// Underruns produce silence without advancing the clock, so video holds
/// position instead of racing ahead while the decoder catches up.
pub struct RingSource {
    ring: Arc<AudioRing>,
    clock: PlaybackClock,
    pending: u32,
}

impl RingSource {
    pub fn new(ring: Arc<AudioRing>, clock: PlaybackClock) -> Self {
        Self {
            ring,
            clock,
            pending: 0,
        }
    }
}

impl Iterator for RingSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        // A seek happened: drop stale samples and resync.
        if self.clock.take_flush() {
            self.ring.clear();
            self.pending = 0;
            return Some(0.0);
        }

        match self.ring.read() {
            Some(sample) => {
                self.pending += 1;
                if self.pending >= CLOCK_BATCH {
                    self.clock.advance(u64::from(self.pending));
                    self.pending = 0;
                }
                Some(sample)
            }
            None => Some(0.0),
        }
    }
}

impl Source for RingSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.clock.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
