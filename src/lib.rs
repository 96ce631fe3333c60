pub mod app;
pub mod input;
pub mod player;
pub mod settings;
pub mod ui;

pub use app::PlayerApp;
pub use input::{GestureCtx, GestureFeedback, GestureKey, KeyboardGestures, TouchpadGestures};
pub use player::{PlayError, PlaybackSurface, SpeedSelection, VideoPlayer, SPEED_PRESETS};
