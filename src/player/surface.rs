use thiserror::Error;

/// Why starting playback failed.
///
/// `Aborted` covers the expected races: the user toggled play/pause fast
/// enough that the request landed on a player that is already tearing down,
/// or the decoder worker shut down between frames. Callers swallow it.
/// Everything else is logged and otherwise ignored.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("playback start aborted")]
    Aborted,
    #[error("playback backend failed: {0}")]
    Backend(String),
}

/// The single mutable target of all transport gestures.
///
/// Time is in seconds. `seek` clamps into `[0, duration]`; implementations
/// with an unknown duration (pre-metadata, live input) report a duration
/// that is not a positive finite number, and callers skip relative seeks
/// in that case.
pub trait PlaybackSurface {
    /// Current playback position in seconds.
    fn position(&self) -> f64;

    /// Move the playhead, clamped into `[0, duration]`.
    fn seek(&mut self, seconds: f64);

    /// Media duration in seconds. Not meaningful unless finite and positive.
    fn duration(&self) -> f64;

    fn is_paused(&self) -> bool;

    fn playback_rate(&self) -> f64;

    /// Apply a playback rate. This is the raw rate on the surface; the
    /// user-selected rate lives outside and is re-applied after warp and
    /// fast-seek excursions.
    fn set_playback_rate(&mut self, rate: f64);

    fn play(&mut self) -> Result<(), PlayError>;

    fn pause(&mut self);
}
