use super::{seek_by, GestureCtx, WHEEL_SEEK_SENSITIVITY};

/// Touchpad gesture handler: horizontal two-finger swipes scrub the
/// playhead. Stateless; every wheel event is translated independently.
///
/// Sign convention: egui reports a rightward swipe as a negative horizontal
/// delta, and a rightward swipe seeks forward, so the offset is
/// `-delta_x * sensitivity`.
pub struct TouchpadGestures {
    sensitivity: f64,
}

impl TouchpadGestures {
    pub fn new() -> Self {
        Self {
            sensitivity: WHEEL_SEEK_SENSITIVITY,
        }
    }

    /// Returns true when the event was a horizontal swipe and must not
    /// reach the default scroll handling. Vertical scrolling is left alone.
    pub fn on_wheel(&self, delta_x: f32, delta_y: f32, ctx: &mut GestureCtx) -> bool {
        if delta_x.abs() < delta_y.abs() {
            return false;
        }

        // Horizontal: consumed even when there is nothing to seek yet.
        let Some(surface) = ctx.surface.as_deref_mut() else {
            return true;
        };
        seek_by(surface, -f64::from(delta_x) * self.sensitivity);
        ctx.feedback.show_controls();
        true
    }
}

impl Default for TouchpadGestures {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{MockSurface, RecordingFeedback};
    use super::*;
    use crate::player::speed::SpeedSelection;
    use crate::player::surface::PlaybackSurface;

    fn run(
        surface: Option<&mut MockSurface>,
        feedback: &mut RecordingFeedback,
        delta_x: f32,
        delta_y: f32,
    ) -> bool {
        let mut speeds = SpeedSelection::new();
        let mut ctx = GestureCtx {
            surface: surface.map(|s| s as &mut dyn PlaybackSurface),
            speeds: &mut speeds,
            feedback,
        };
        TouchpadGestures::new().on_wheel(delta_x, delta_y, &mut ctx)
    }

    #[test]
    fn horizontal_swipe_seeks_and_shows_controls() {
        let mut surface = MockSurface::playing(10.0, 100.0);
        let mut feedback = RecordingFeedback::default();

        let consumed = run(Some(&mut surface), &mut feedback, 100.0, 10.0);
        assert!(consumed);
        // 100 units at 0.05 s/unit, positive delta seeks back.
        assert_eq!(surface.position, 5.0);
        assert_eq!(feedback.controls, 1);
    }

    #[test]
    fn negative_delta_seeks_forward() {
        let mut surface = MockSurface::playing(10.0, 100.0);
        let mut feedback = RecordingFeedback::default();

        run(Some(&mut surface), &mut feedback, -100.0, 0.0);
        assert_eq!(surface.position, 15.0);
    }

    #[test]
    fn vertical_scroll_is_left_alone() {
        let mut surface = MockSurface::playing(10.0, 100.0);
        let mut feedback = RecordingFeedback::default();

        let consumed = run(Some(&mut surface), &mut feedback, 10.0, 100.0);
        assert!(!consumed);
        assert_eq!(surface.position, 10.0);
        assert!(surface.seeks.is_empty());
        assert_eq!(feedback.controls, 0);
    }

    #[test]
    fn equal_deltas_count_as_horizontal() {
        let mut surface = MockSurface::playing(10.0, 100.0);
        let mut feedback = RecordingFeedback::default();

        let consumed = run(Some(&mut surface), &mut feedback, 50.0, 50.0);
        assert!(consumed);
        assert_eq!(surface.position, 7.5);
    }

    #[test]
    fn seek_clamps_to_media_bounds() {
        let mut surface = MockSurface::playing(2.0, 100.0);
        let mut feedback = RecordingFeedback::default();
        run(Some(&mut surface), &mut feedback, 100.0, 0.0);
        assert_eq!(surface.position, 0.0);

        let mut surface = MockSurface::playing(98.0, 100.0);
        run(Some(&mut surface), &mut feedback, -100.0, 0.0);
        assert_eq!(surface.position, 100.0);
    }

    #[test]
    fn missing_surface_consumes_without_feedback() {
        let mut feedback = RecordingFeedback::default();
        let consumed = run(None, &mut feedback, 100.0, 0.0);
        assert!(consumed);
        assert_eq!(feedback.controls, 0);
    }

    #[test]
    fn unusable_duration_skips_the_seek() {
        let mut surface = MockSurface::playing(10.0, f64::NAN);
        let mut feedback = RecordingFeedback::default();

        let consumed = run(Some(&mut surface), &mut feedback, 100.0, 0.0);
        assert!(consumed);
        assert!(surface.seeks.is_empty());
        // Surface exists, so the controls still surface.
        assert_eq!(feedback.controls, 1);
    }
}
