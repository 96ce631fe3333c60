use crossbeam_channel::Receiver;
use std::collections::VecDeque;

/// Seconds a frame may lag the clock before it is dropped.
const LATE_TOLERANCE: f64 = 0.02;
/// Seconds a frame may lead the clock and still be promoted.
const EARLY_TOLERANCE: f64 = 0.02;
/// Frames arriving before this far ahead of a seek target are discarded.
const SEEK_SLACK: f64 = 0.5;

/// A decoded frame ready for upload, PTS in seconds.
pub struct VideoFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub pts: f64,
}

/// Buffers decoded frames and picks the one due at the current clock time.
/// Late frames are dropped, early frames held back.
pub struct FrameQueue {
    incoming: Receiver<VideoFrame>,
    pending: VecDeque<VideoFrame>,
    shown: Option<VideoFrame>,
    capacity: usize,
}

impl FrameQueue {
    pub fn new(incoming: Receiver<VideoFrame>, capacity: usize) -> Self {
        Self {
            incoming,
            pending: VecDeque::with_capacity(capacity),
            shown: None,
            capacity,
        }
    }

    fn drain_channel(&mut self) {
        while self.pending.len() < self.capacity {
            match self.incoming.try_recv() {
                Ok(frame) => self.pending.push_back(frame),
                Err(_) => break,
            }
        }
    }

    /// Frame that should be on screen at `clock_seconds`, if it changed.
    pub fn frame_for(&mut self, clock_seconds: f64) -> Option<&VideoFrame> {
        self.drain_channel();

        while let Some(frame) = self.pending.front() {
            if frame.pts < clock_seconds - LATE_TOLERANCE {
                self.pending.pop_front();
            } else {
                break;
            }
        }

        if let Some(frame) = self.pending.front() {
            if frame.pts <= clock_seconds + EARLY_TOLERANCE {
                self.shown = self.pending.pop_front();
            }
        }

        self.shown.as_ref()
    }

    /// First usable frame after a seek. More lenient than [`frame_for`]:
    /// anything at or past the target (minus slack) is accepted so the
    /// screen updates as soon as the decoder lands near the target.
    pub fn frame_after_seek(&mut self, target: f64) -> Option<&VideoFrame> {
        self.drain_channel();

        while let Some(frame) = self.pending.front() {
            if frame.pts < target - SEEK_SLACK {
                self.pending.pop_front();
            } else {
                break;
            }
        }

        if self.pending.front().is_some() {
            self.shown = self.pending.pop_front();
        }

        self.shown.as_ref()
    }

    /// Drop everything buffered, including frames still in the channel.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.shown = None;
        while self.incoming.try_recv().is_ok() {}
    }

    /// True once no frame is buffered anywhere (end of stream).
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.shown.is_none() && self.incoming.is_empty()
    }
}
