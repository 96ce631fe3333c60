use std::time::Instant;

use super::{
    safe_play, seek_by, toggle_play, GestureCtx, GestureKey, FAST_FORWARD_RATE,
    LONG_PRESS_THRESHOLD, REWIND_JUMP_INTERVAL, REWIND_JUMP_SECS, SHORT_SEEK_SECS, WARP_RATE,
};

/// Space key session. `Warp` means the long press fired and warp-rate
/// playback is in effect until release.
#[derive(Clone, Copy)]
enum SpaceState {
    Idle,
    Down { pressed_at: Instant },
    Warp,
}

/// Left/right arrow session. The two keys share one session: a second
/// arrow key-down while one is active is ignored.
#[derive(Clone, Copy)]
enum ArrowState {
    Idle,
    Down {
        direction: SeekDirection,
        pressed_at: Instant,
    },
    Scrub(Scrub),
}

/// What a held arrow key is doing after the long-press fire.
#[derive(Clone, Copy)]
enum Scrub {
    /// Right: fast-forward rate. `resumed_playback` notes that the hold
    /// started playback on a paused surface, so release pauses again.
    FastForward { resumed_playback: bool },
    /// Left: discrete jumps back on a fixed schedule (there is no negative
    /// playback rate to scrub with).
    RewindJumps { next_jump_at: Instant },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SeekDirection {
    Back,
    Forward,
}

impl SeekDirection {
    fn of(key: GestureKey) -> Self {
        if key == GestureKey::ArrowRight {
            Self::Forward
        } else {
            Self::Back
        }
    }

    fn signum(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Back => -1.0,
        }
    }
}

/// Keyboard gesture handler: short vs. long presses of Space and the
/// arrow keys, translated into transport actions.
///
/// All methods take `now` explicitly; [`tick`](Self::tick) must be called
/// once per frame to fire pending long-press deadlines and rewind jumps.
/// Key-up first settles any deadline that has already passed, so the
/// observable order is always key-down, optional fire, key-up, even when
/// down and up both land between two frames.
pub struct KeyboardGestures {
    space: SpaceState,
    arrows: ArrowState,
}

impl KeyboardGestures {
    pub fn new() -> Self {
        Self {
            space: SpaceState::Idle,
            arrows: ArrowState::Idle,
        }
    }

    /// Returns true when the key is one the handler owns; the caller must
    /// then suppress the event's default handling, whatever branch ran.
    pub fn on_key_down(&mut self, key: GestureKey, now: Instant, ctx: &mut GestureCtx) -> bool {
        match key {
            GestureKey::Space => {
                // Held keys repeat their down events; only the first opens
                // a session.
                if matches!(self.space, SpaceState::Idle) {
                    self.space = SpaceState::Down { pressed_at: now };
                }
                true
            }
            GestureKey::ArrowLeft | GestureKey::ArrowRight => {
                if matches!(self.arrows, ArrowState::Idle) {
                    self.arrows = ArrowState::Down {
                        direction: SeekDirection::of(key),
                        pressed_at: now,
                    };
                }
                true
            }
            GestureKey::ArrowUp => {
                step_speed(ctx, true);
                true
            }
            GestureKey::ArrowDown => {
                step_speed(ctx, false);
                true
            }
        }
    }

    pub fn on_key_up(&mut self, key: GestureKey, now: Instant, ctx: &mut GestureCtx) -> bool {
        // A deadline that elapsed since the last frame fires before the
        // release is interpreted.
        self.tick(now, ctx);

        match key {
            GestureKey::Space => {
                match std::mem::replace(&mut self.space, SpaceState::Idle) {
                    // Stray key-up with no session: consumed, no action.
                    SpaceState::Idle => {}
                    SpaceState::Down { .. } => {
                        if let Some(surface) = ctx.surface.as_deref_mut() {
                            toggle_play(surface);
                        }
                    }
                    SpaceState::Warp => {
                        let rate = ctx.speeds.rate();
                        if let Some(surface) = ctx.surface.as_deref_mut() {
                            surface.set_playback_rate(rate);
                        }
                        ctx.feedback.warp_ended();
                    }
                }
                true
            }
            GestureKey::ArrowLeft | GestureKey::ArrowRight => {
                let direction = SeekDirection::of(key);
                match std::mem::replace(&mut self.arrows, ArrowState::Idle) {
                    ArrowState::Idle => {}
                    ArrowState::Down { .. } => {
                        if let Some(surface) = ctx.surface.as_deref_mut() {
                            seek_by(surface, direction.signum() * SHORT_SEEK_SECS);
                        }
                    }
                    ArrowState::Scrub(kind) => {
                        let rate = ctx.speeds.rate();
                        if let Some(surface) = ctx.surface.as_deref_mut() {
                            surface.set_playback_rate(rate);
                            if let Scrub::FastForward {
                                resumed_playback: true,
                            } = kind
                            {
                                surface.pause();
                            }
                        }
                        ctx.feedback.show_controls();
                    }
                }
                true
            }
            GestureKey::ArrowUp | GestureKey::ArrowDown => true,
        }
    }

    /// Fire any deadline that `now` has passed: the one-shot long-press
    /// transitions and every overdue rewind jump.
    pub fn tick(&mut self, now: Instant, ctx: &mut GestureCtx) {
        if let SpaceState::Down { pressed_at } = self.space {
            if now.duration_since(pressed_at) >= LONG_PRESS_THRESHOLD {
                // Without a surface there is nothing to warp; the session
                // stays armed and fires once one exists.
                if let Some(surface) = ctx.surface.as_deref_mut() {
                    surface.set_playback_rate(WARP_RATE);
                    if surface.is_paused() {
                        safe_play(surface);
                    }
                    ctx.feedback.warp_started();
                    self.space = SpaceState::Warp;
                }
            }
        }

        if let ArrowState::Down {
            direction,
            pressed_at,
        } = self.arrows
        {
            if now.duration_since(pressed_at) >= LONG_PRESS_THRESHOLD {
                ctx.feedback.show_controls();
                self.arrows = ArrowState::Scrub(match direction {
                    SeekDirection::Forward => {
                        let mut resumed_playback = false;
                        if let Some(surface) = ctx.surface.as_deref_mut() {
                            surface.set_playback_rate(FAST_FORWARD_RATE);
                            if surface.is_paused() {
                                resumed_playback = true;
                                safe_play(surface);
                            }
                        }
                        Scrub::FastForward { resumed_playback }
                    }
                    SeekDirection::Back => {
                        // First jump immediately, the rest on a schedule
                        // anchored to the fire time.
                        if let Some(surface) = ctx.surface.as_deref_mut() {
                            seek_by(surface, -REWIND_JUMP_SECS);
                        }
                        Scrub::RewindJumps {
                            next_jump_at: pressed_at + LONG_PRESS_THRESHOLD + REWIND_JUMP_INTERVAL,
                        }
                    }
                });
            }
        }

        if let ArrowState::Scrub(Scrub::RewindJumps { mut next_jump_at }) = self.arrows {
            // A late tick fires every overdue jump, not just one.
            while now >= next_jump_at {
                if let Some(surface) = ctx.surface.as_deref_mut() {
                    seek_by(surface, -REWIND_JUMP_SECS);
                }
                next_jump_at += REWIND_JUMP_INTERVAL;
            }
            self.arrows = ArrowState::Scrub(Scrub::RewindJumps { next_jump_at });
        }
    }

    /// True while any key session is open; the app keeps repainting so
    /// deadlines keep getting checked.
    pub fn is_active(&self) -> bool {
        !matches!(self.space, SpaceState::Idle) || !matches!(self.arrows, ArrowState::Idle)
    }

    /// Drop both sessions and every pending deadline. Idempotent. Called on
    /// teardown and whenever the surface is replaced, so nothing stale ever
    /// touches a new surface.
    pub fn reset(&mut self) {
        self.space = SpaceState::Idle;
        self.arrows = ArrowState::Idle;
    }
}

impl Default for KeyboardGestures {
    fn default() -> Self {
        Self::new()
    }
}

/// Up/down speed stepping acts immediately on key-down; no session. Ignored
/// until a surface exists, like every other transport action.
fn step_speed(ctx: &mut GestureCtx, up: bool) {
    let Some(surface) = ctx.surface.as_deref_mut() else {
        return;
    };
    let changed = if up {
        ctx.speeds.step_up()
    } else {
        ctx.speeds.step_down()
    };
    if let Some(rate) = changed {
        surface.set_playback_rate(rate);
        ctx.feedback.show_speed_indicator();
    }
}
