//! End-to-end gesture flows against a scripted playback surface: the same
//! sequences a user produces at the keyboard, with time fully simulated.

use std::time::{Duration, Instant};

use playhead::input::{
    GestureCtx, GestureFeedback, GestureKey, KeyboardGestures, TouchpadGestures,
};
use playhead::player::{PlayError, PlaybackSurface, SpeedSelection};

struct ScriptedSurface {
    position: f64,
    duration: f64,
    paused: bool,
    rate: f64,
    play_calls: usize,
    pause_calls: usize,
}

impl ScriptedSurface {
    fn new(position: f64, duration: f64, paused: bool) -> Self {
        Self {
            position,
            duration,
            paused,
            rate: 1.0,
            play_calls: 0,
            pause_calls: 0,
        }
    }
}

impl PlaybackSurface for ScriptedSurface {
    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds.clamp(0.0, self.duration);
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn play(&mut self) -> Result<(), PlayError> {
        self.play_calls += 1;
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
        self.paused = true;
    }
}

#[derive(Default)]
struct NullFeedback {
    controls: usize,
    speed_indicator: usize,
}

impl GestureFeedback for NullFeedback {
    fn show_controls(&mut self) {
        self.controls += 1;
    }

    fn show_speed_indicator(&mut self) {
        self.speed_indicator += 1;
    }
}

struct Session {
    keys: KeyboardGestures,
    wheel: TouchpadGestures,
    surface: ScriptedSurface,
    speeds: SpeedSelection,
    feedback: NullFeedback,
    base: Instant,
}

impl Session {
    fn new(surface: ScriptedSurface) -> Self {
        Self {
            keys: KeyboardGestures::new(),
            wheel: TouchpadGestures::new(),
            surface,
            speeds: SpeedSelection::new(),
            feedback: NullFeedback::default(),
            base: Instant::now(),
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.base + Duration::from_millis(ms)
    }

    fn key_down(&mut self, key: GestureKey, ms: u64) {
        let now = self.at(ms);
        let mut ctx = GestureCtx {
            surface: Some(&mut self.surface as &mut dyn PlaybackSurface),
            speeds: &mut self.speeds,
            feedback: &mut self.feedback,
        };
        self.keys.on_key_down(key, now, &mut ctx);
    }

    fn key_up(&mut self, key: GestureKey, ms: u64) {
        let now = self.at(ms);
        let mut ctx = GestureCtx {
            surface: Some(&mut self.surface as &mut dyn PlaybackSurface),
            speeds: &mut self.speeds,
            feedback: &mut self.feedback,
        };
        self.keys.on_key_up(key, now, &mut ctx);
    }

    fn tick(&mut self, ms: u64) {
        let now = self.at(ms);
        let mut ctx = GestureCtx {
            surface: Some(&mut self.surface as &mut dyn PlaybackSurface),
            speeds: &mut self.speeds,
            feedback: &mut self.feedback,
        };
        self.keys.tick(now, &mut ctx);
    }

    fn scroll(&mut self, delta_x: f32, delta_y: f32) -> bool {
        let mut ctx = GestureCtx {
            surface: Some(&mut self.surface as &mut dyn PlaybackSurface),
            speeds: &mut self.speeds,
            feedback: &mut self.feedback,
        };
        self.wheel.on_wheel(delta_x, delta_y, &mut ctx)
    }
}

#[test]
fn tap_then_hold_space_keeps_user_speed_intact() {
    let mut session = Session::new(ScriptedSurface::new(30.0, 300.0, true));

    // Bump the user speed to 1.5 with two Up taps.
    session.key_down(GestureKey::ArrowUp, 0);
    session.key_up(GestureKey::ArrowUp, 30);
    session.key_down(GestureKey::ArrowUp, 60);
    session.key_up(GestureKey::ArrowUp, 90);
    assert_eq!(session.speeds.rate(), 1.5);
    assert_eq!(session.surface.rate, 1.5);

    // Tap Space: starts playback.
    session.key_down(GestureKey::Space, 1000);
    session.key_up(GestureKey::Space, 1100);
    assert!(!session.surface.paused);

    // Hold Space: warp to 2x, then release back to 1.5, still playing.
    session.key_down(GestureKey::Space, 2000);
    session.tick(2250);
    assert_eq!(session.surface.rate, 2.0);
    session.key_up(GestureKey::Space, 2600);
    assert_eq!(session.surface.rate, 1.5);
    assert!(!session.surface.paused);
}

#[test]
fn boundary_press_durations_pick_the_right_action() {
    // 199 ms: short. The playhead moves one second, the rate never changes.
    let mut session = Session::new(ScriptedSurface::new(10.0, 100.0, false));
    session.key_down(GestureKey::ArrowRight, 0);
    session.key_up(GestureKey::ArrowRight, 199);
    assert_eq!(session.surface.position, 11.0);
    assert_eq!(session.surface.rate, 1.0);

    // 201 ms: long. No one-second nudge; fast-forward happened instead.
    let mut session = Session::new(ScriptedSurface::new(10.0, 100.0, false));
    session.key_down(GestureKey::ArrowRight, 0);
    session.tick(201);
    assert_eq!(session.surface.rate, 16.0);
    session.key_up(GestureKey::ArrowRight, 210);
    assert_eq!(session.surface.position, 10.0);
    assert_eq!(session.surface.rate, 1.0);
}

#[test]
fn held_left_arrow_rewinds_at_least_six_seconds_by_650ms() {
    let mut session = Session::new(ScriptedSurface::new(10.0, 100.0, false));

    session.key_down(GestureKey::ArrowLeft, 0);
    for ms in (0..=650).step_by(16) {
        session.tick(ms);
    }
    assert!(
        session.surface.position <= 4.0,
        "expected at least two 3s jumps by 650ms, at {}",
        session.surface.position
    );

    session.key_up(GestureKey::ArrowLeft, 650);
    // Release ends the schedule; nothing moves afterwards.
    let parked = session.surface.position;
    session.tick(2000);
    assert_eq!(session.surface.position, parked);
}

#[test]
fn fast_forward_from_pause_returns_to_pause() {
    let mut session = Session::new(ScriptedSurface::new(50.0, 100.0, true));

    session.key_down(GestureKey::ArrowRight, 0);
    session.tick(250);
    assert!(!session.surface.paused);
    assert_eq!(session.surface.rate, 16.0);

    session.key_up(GestureKey::ArrowRight, 900);
    assert!(session.surface.paused);
    assert_eq!(session.surface.rate, 1.0);
}

#[test]
fn wheel_scrub_moves_and_vertical_scroll_does_not() {
    let mut session = Session::new(ScriptedSurface::new(10.0, 100.0, false));

    assert!(session.scroll(100.0, 10.0));
    assert_eq!(session.surface.position, 5.0);
    assert_eq!(session.feedback.controls, 1);

    assert!(!session.scroll(10.0, 100.0));
    assert_eq!(session.surface.position, 5.0);
    assert_eq!(session.feedback.controls, 1);
}

#[test]
fn disposal_silences_all_pending_timers() {
    let mut session = Session::new(ScriptedSurface::new(10.0, 100.0, false));

    session.key_down(GestureKey::Space, 0);
    session.key_down(GestureKey::ArrowLeft, 0);
    session.keys.reset();

    for ms in [250, 500, 1000, 5000] {
        session.tick(ms);
    }
    assert_eq!(session.surface.position, 10.0);
    assert_eq!(session.surface.rate, 1.0);
    assert_eq!(session.surface.play_calls, 0);
    assert_eq!(session.surface.pause_calls, 0);
}

#[test]
fn speed_cycle_round_trip() {
    let mut session = Session::new(ScriptedSurface::new(0.0, 100.0, false));

    for i in 0..5 {
        session.key_down(GestureKey::ArrowUp, i * 20);
    }
    assert_eq!(session.speeds.rate(), 2.0);

    for i in 0..5 {
        session.key_down(GestureKey::ArrowDown, 200 + i * 20);
    }
    assert_eq!(session.speeds.rate(), 1.0);
    assert_eq!(session.feedback.speed_indicator, 6);
}
