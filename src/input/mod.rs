//! Input gesture handling: the keyboard and touchpad handlers that turn raw
//! events into transport actions on the playback surface.
//!
//! Both handlers are driven by the UI thread. Time is always passed in
//! explicitly, so the press-duration logic runs against a virtual clock in
//! tests. Pending "timers" (the long-press fire and the repeating rewind
//! jump) are plain deadlines checked by [`KeyboardGestures::tick`] once per
//! frame.

mod keyboard;
mod touchpad;

pub use keyboard::KeyboardGestures;
pub use touchpad::TouchpadGestures;

use std::time::Duration;

use crate::player::speed::SpeedSelection;
use crate::player::surface::{PlayError, PlaybackSurface};

/// Hold a key this long to switch from tap to hold semantics.
pub const LONG_PRESS_THRESHOLD: Duration = Duration::from_millis(200);
/// Seconds moved by a short arrow press.
pub const SHORT_SEEK_SECS: f64 = 1.0;
/// Rate forced while Space is held.
pub const WARP_RATE: f64 = 2.0;
/// Rate forced while ArrowRight is held.
pub const FAST_FORWARD_RATE: f64 = 16.0;
/// Seconds jumped per rewind step while ArrowLeft is held. There is no
/// negative playback rate; reverse scrubbing is discrete timed jumps.
pub const REWIND_JUMP_SECS: f64 = 3.0;
/// Interval between rewind jumps.
pub const REWIND_JUMP_INTERVAL: Duration = Duration::from_millis(300);
/// Seconds seeked per unit of horizontal wheel delta.
pub const WHEEL_SEEK_SENSITIVITY: f64 = 0.05;

/// The keys the gesture core owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKey {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl GestureKey {
    pub fn from_egui(key: egui::Key) -> Option<Self> {
        match key {
            egui::Key::Space => Some(Self::Space),
            egui::Key::ArrowLeft => Some(Self::ArrowLeft),
            egui::Key::ArrowRight => Some(Self::ArrowRight),
            egui::Key::ArrowUp => Some(Self::ArrowUp),
            egui::Key::ArrowDown => Some(Self::ArrowDown),
            _ => None,
        }
    }
}

/// View-layer callbacks the gesture core fires. Implemented by the overlay
/// state; the warp pair is optional for hosts that have no warp visual.
pub trait GestureFeedback {
    fn show_controls(&mut self);
    fn show_speed_indicator(&mut self);
    fn warp_started(&mut self) {}
    fn warp_ended(&mut self) {}
}

/// Everything a gesture action may touch, bundled per call.
///
/// `surface` is `None` until a video is loaded; actions on an absent
/// surface degrade to no-ops inside the helpers below, which is the single
/// place that absence is handled.
pub struct GestureCtx<'a> {
    pub surface: Option<&'a mut dyn PlaybackSurface>,
    pub speeds: &'a mut SpeedSelection,
    pub feedback: &'a mut dyn GestureFeedback,
}

/// Start playback, swallowing the expected abort race and logging anything
/// else. Best-effort: a dropped gesture is fine, a crashed handler is not.
pub fn safe_play(surface: &mut dyn PlaybackSurface) {
    match surface.play() {
        Ok(()) => {}
        Err(PlayError::Aborted) => log::debug!("play aborted mid-transition"),
        Err(err) => log::warn!("failed to start playback: {err}"),
    }
}

pub fn toggle_play(surface: &mut dyn PlaybackSurface) {
    if surface.is_paused() {
        safe_play(surface);
    } else {
        surface.pause();
    }
}

/// Relative seek, skipped entirely when the duration is not usable yet.
pub(crate) fn seek_by(surface: &mut dyn PlaybackSurface, offset: f64) {
    let duration = surface.duration();
    if !duration.is_finite() || duration <= 0.0 {
        return;
    }
    let target = (surface.position() + offset).clamp(0.0, duration);
    surface.seek(target);
}
