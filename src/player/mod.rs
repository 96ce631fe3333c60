mod audio;
mod audio_ring;
mod clock;
mod decoder;
pub mod speed;
pub mod surface;
mod video;

use anyhow::{Context as _, Result};
use crossbeam_channel::{bounded, Sender};
use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use audio::RingSource;
use audio_ring::AudioRing;
use clock::PlaybackClock;
use decoder::{probe, spawn_worker, WorkerCommand};
use video::FrameQueue;

pub use speed::{SpeedSelection, SPEED_PRESETS};
pub use surface::{PlayError, PlaybackSurface};

/// Rates above this mute audio: resampled pitch-shifted audio at fast-seek
/// speeds is noise, not signal. The user volume comes back when the rate
/// drops to the audible range.
pub const AUTO_MUTE_ABOVE: f64 = 2.0;

/// Accepted playback rate range for the surface.
const RATE_RANGE: std::ops::RangeInclusive<f64> = 0.25..=16.0;

/// Video player backed by a decoder worker thread, a rodio sink, and an
/// audio-driven clock. Implements [`PlaybackSurface`], the target of all
/// transport gestures.
pub struct VideoPlayer {
    paused: bool,
    seeking: bool,
    seek_target: f64,

    width: u32,
    height: u32,
    duration: f64,
    rate: f64,
    volume: f32,

    worker: Option<JoinHandle<()>>,
    commands: Sender<WorkerCommand>,
    stop: Arc<AtomicBool>,

    _output_stream: OutputStream, // keep alive
    _stream_handle: OutputStreamHandle,
    sink: Sink,
    clock: PlaybackClock,

    frames: FrameQueue,
    texture: Option<TextureHandle>,
}

impl VideoPlayer {
    /// Open a video file and prepare for playback, paused at the first frame.
    pub fn open(path: &Path, ctx: Context) -> Result<Self> {
        let info = probe(path)?;

        let clock = PlaybackClock::new(info.sample_rate, info.channels);

        let (output_stream, stream_handle) =
            OutputStream::try_default().context("no audio output device")?;
        let sink = Sink::try_new(&stream_handle).context("failed to create audio sink")?;

        // About one second of audio.
        let ring =
            AudioRing::with_capacity(info.sample_rate as usize * info.channels as usize * 2);
        sink.append(RingSource::new(ring.clone(), clock.clone()));
        sink.pause();

        let (frames_tx, frames_rx) = bounded(30);
        let frames = FrameQueue::new(frames_rx, 30);

        let (commands_tx, commands_rx) = bounded(16);
        let stop = Arc::new(AtomicBool::new(false));
        let worker = spawn_worker(
            path,
            frames_tx,
            ring,
            commands_rx,
            clock.clone(),
            stop.clone(),
        )?;

        let texture = ctx.load_texture(
            "video_frame",
            ColorImage::new(
                [info.width as usize, info.height as usize],
                egui::Color32::BLACK,
            ),
            TextureOptions::LINEAR,
        );

        let mut player = Self {
            paused: true,
            seeking: false,
            seek_target: 0.0,
            width: info.width,
            height: info.height,
            duration: info.duration,
            rate: 1.0,
            volume: 1.0,
            worker: Some(worker),
            commands: commands_tx,
            stop,
            _output_stream: output_stream,
            _stream_handle: stream_handle,
            sink,
            clock,
            frames,
            texture: Some(texture),
        };

        // Let the worker decode toward the first frame so something shows
        // before the user hits play.
        let _ = player.commands.send(WorkerCommand::Play);
        player.seek(0.0);

        Ok(player)
    }

    /// Per-frame pump: settle pending seeks, upload due frames, park at end
    /// of stream.
    pub fn update(&mut self, ctx: &Context) {
        if self.seeking {
            if let Some(frame) = self.frames.frame_after_seek(self.seek_target) {
                if let Some(texture) = &mut self.texture {
                    let image = ColorImage::from_rgba_unmultiplied(
                        [frame.width as usize, frame.height as usize],
                        &frame.rgba,
                    );
                    texture.set(image, TextureOptions::LINEAR);
                }
                // Snap the clock to the frame we actually landed on.
                self.clock.set_seconds(frame.pts);
                self.seeking = false;
                if !self.paused {
                    self.sink.play();
                }
            }
            ctx.request_repaint();
            return;
        }

        if self.paused {
            return;
        }

        let now = self.clock.seconds();
        if let Some(frame) = self.frames.frame_for(now) {
            if let Some(texture) = &mut self.texture {
                let image = ColorImage::from_rgba_unmultiplied(
                    [frame.width as usize, frame.height as usize],
                    &frame.rgba,
                );
                texture.set(image, TextureOptions::LINEAR);
            }
        }

        // End of stream: park, leaving the last frame up.
        if self.frames.is_drained() && now >= self.duration - 0.1 {
            self.pause();
        }

        ctx.request_repaint();
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    pub fn video_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True while a seek is waiting for its first decoded frame.
    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    /// User volume, 0.0 to 1.0. Remembered across auto-mute excursions.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if self.rate <= AUTO_MUTE_ABOVE {
            self.sink.set_volume(self.volume);
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn worker_died(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }
}

impl PlaybackSurface for VideoPlayer {
    fn position(&self) -> f64 {
        if self.seeking {
            self.seek_target
        } else {
            self.clock.seconds()
        }
    }

    fn seek(&mut self, seconds: f64) {
        let target = if self.duration > 0.0 {
            seconds.clamp(0.0, self.duration)
        } else {
            seconds.max(0.0)
        };
        self.seeking = true;
        self.seek_target = target;
        // Silence during the seek so the clock holds still.
        self.sink.pause();
        self.frames.clear();
        self.clock.set_seconds(target);
        let _ = self.commands.send(WorkerCommand::Seek(target));
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
        let rate = rate.clamp(*RATE_RANGE.start(), *RATE_RANGE.end());
        self.rate = rate;
        self.sink.set_speed(rate as f32);
        if rate > AUTO_MUTE_ABOVE {
            self.sink.set_volume(0.0);
        } else {
            self.sink.set_volume(self.volume);
        }
    }

    fn play(&mut self) -> Result<(), PlayError> {
        if !self.paused {
            return Ok(());
        }
        if self.stop.load(Ordering::Relaxed) {
            return Err(PlayError::Aborted);
        }
        if self.worker_died() {
            return Err(PlayError::Backend("decoder worker exited".into()));
        }
        self.commands
            .send(WorkerCommand::Play)
            .map_err(|_| PlayError::Aborted)?;
        if !self.seeking {
            self.sink.play();
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.sink.pause();
        let _ = self.commands.send(WorkerCommand::Pause);
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.commands.send(WorkerCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
