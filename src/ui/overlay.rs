use std::time::{Duration, Instant};

use crate::input::GestureFeedback;

/// How long the control bar lingers after activity.
pub const CONTROLS_LINGER: Duration = Duration::from_millis(2500);
/// How long the speed badge stays up after a speed change.
pub const SPEED_BADGE_LINGER: Duration = Duration::from_millis(1200);

/// Transient view state: which overlays are up and until when. All queries
/// take `now` so the timing is testable without sleeping.
#[derive(Default)]
pub struct OverlayState {
    controls_until: Option<Instant>,
    speed_badge_until: Option<Instant>,
    warp_active: bool,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_controls(&mut self, now: Instant) {
        self.controls_until = Some(now + CONTROLS_LINGER);
    }

    pub fn show_speed_badge(&mut self, now: Instant) {
        self.speed_badge_until = Some(now + SPEED_BADGE_LINGER);
    }

    pub fn set_warp(&mut self, active: bool) {
        self.warp_active = active;
    }

    pub fn controls_visible(&self, now: Instant) -> bool {
        self.controls_until.is_some_and(|until| now < until)
    }

    pub fn speed_badge_visible(&self, now: Instant) -> bool {
        self.speed_badge_until.is_some_and(|until| now < until)
    }

    pub fn warp_active(&self) -> bool {
        self.warp_active
    }

    /// Time until the next overlay expires, for scheduling a repaint.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        [self.controls_until, self.speed_badge_until]
            .into_iter()
            .flatten()
            .filter(|&until| until > now)
            .map(|until| until - now)
            .min()
    }

    /// Drop every overlay, e.g. when the video is replaced.
    pub fn clear(&mut self) {
        self.controls_until = None;
        self.speed_badge_until = None;
        self.warp_active = false;
    }
}

/// Binds an [`OverlayState`] to the current frame time so it can serve as
/// the gesture core's feedback sink, whose callbacks carry no timestamp.
pub struct OverlayFeedback<'a> {
    pub overlay: &'a mut OverlayState,
    pub now: Instant,
}

impl GestureFeedback for OverlayFeedback<'_> {
    fn show_controls(&mut self) {
        self.overlay.show_controls(self.now);
    }

    fn show_speed_indicator(&mut self) {
        self.overlay.show_speed_badge(self.now);
    }

    fn warp_started(&mut self) {
        self.overlay.set_warp(true);
    }

    fn warp_ended(&mut self) {
        self.overlay.set_warp(false);
    }
}
