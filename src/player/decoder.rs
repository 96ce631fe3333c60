use anyhow::{anyhow, Context as _, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use ffmpeg_next::format::context::Input;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::{Audio as RawAudio, Video as RawVideo};
use ffmpeg_next::media::Type;
use ffmpeg_next::software::resampling::Context as Resampler;
use ffmpeg_next::software::scaling::{Context as Scaler, Flags};
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::Sample;
use ffmpeg_next::{codec, decoder, Packet, Rational};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::audio_ring::AudioRing;
use super::clock::PlaybackClock;
use super::video::VideoFrame;

/// Commands accepted by the decoder worker.
pub enum WorkerCommand {
    Play,
    Pause,
    Seek(f64),
    Shutdown,
}

/// Stream properties read up front, before decoding starts.
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Open a media file and read its stream properties without decoding.
pub fn probe(path: &Path) -> Result<MediaInfo> {
    let input = ffmpeg_next::format::input(path).context("failed to open input file")?;

    let video_stream = input
        .streams()
        .best(Type::Video)
        .ok_or_else(|| anyhow!("no video stream found"))?;

    let video = codec::Context::from_parameters(video_stream.parameters())?
        .decoder()
        .video()?;

    let (sample_rate, channels) = match input.streams().best(Type::Audio) {
        Some(stream) => {
            let audio = codec::Context::from_parameters(stream.parameters())?
                .decoder()
                .audio()?;
            (audio.rate(), audio.channels() as u16)
        }
        // Silent files still need a clock; run it at a nominal rate.
        None => (44_100, 2),
    };

    let duration = if input.duration() > 0 {
        input.duration() as f64 / ffmpeg_next::ffi::AV_TIME_BASE as f64
    } else {
        0.0
    };

    Ok(MediaInfo {
        width: video.width(),
        height: video.height(),
        duration,
        sample_rate,
        channels,
    })
}

/// Start the decoder worker thread for `path`.
pub fn spawn_worker(
    path: &Path,
    frames_tx: Sender<VideoFrame>,
    ring: Arc<AudioRing>,
    commands: Receiver<WorkerCommand>,
    clock: PlaybackClock,
    stop: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let path = path.to_path_buf();
    let handle = thread::Builder::new()
        .name("playhead-decode".into())
        .spawn(move || {
            match DecodeWorker::open(&path, frames_tx, ring, commands, clock, stop) {
                Ok(mut worker) => {
                    if let Err(err) = worker.run() {
                        log::error!("decoder worker failed: {err:#}");
                    }
                }
                Err(err) => log::error!("failed to open {}: {err:#}", path.display()),
            }
        })
        .context("failed to spawn decoder thread")?;
    Ok(handle)
}

enum Flow {
    Continue,
    Exit,
}

enum DeliverOutcome {
    Sent,
    /// A seek arrived while the frame channel was blocked; the frame and
    /// everything decoded after it are stale.
    Abandoned,
    Exit,
}

struct DecodeWorker {
    input: Input,
    video: decoder::Video,
    audio: Option<decoder::Audio>,
    scaler: Scaler,
    resampler: Option<Resampler>,
    video_stream: usize,
    audio_stream: Option<usize>,
    video_time_base: Rational,

    frames_tx: Sender<VideoFrame>,
    ring: Arc<AudioRing>,
    commands: Receiver<WorkerCommand>,
    clock: PlaybackClock,
    stop: Arc<AtomicBool>,

    paused: bool,
    pending_seek: Option<f64>,
    at_eof: bool,

    scratch_video: RawVideo,
    scratch_rgba: RawVideo,
    scratch_audio: RawAudio,
}

impl DecodeWorker {
    fn open(
        path: &Path,
        frames_tx: Sender<VideoFrame>,
        ring: Arc<AudioRing>,
        commands: Receiver<WorkerCommand>,
        clock: PlaybackClock,
        stop: Arc<AtomicBool>,
    ) -> Result<Self> {
        let input = ffmpeg_next::format::input(path)?;

        let video_stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| anyhow!("no video stream"))?
            .index();
        let audio_stream = input.streams().best(Type::Audio).map(|s| s.index());

        let stream = input
            .stream(video_stream)
            .ok_or_else(|| anyhow!("video stream vanished"))?;
        let video_time_base = stream.time_base();
        let video = codec::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let audio = match audio_stream {
            Some(index) => {
                let stream = input
                    .stream(index)
                    .ok_or_else(|| anyhow!("audio stream vanished"))?;
                Some(
                    codec::Context::from_parameters(stream.parameters())?
                        .decoder()
                        .audio()?,
                )
            }
            None => None,
        };

        let scaler = Scaler::get(
            video.format(),
            video.width(),
            video.height(),
            Pixel::RGBA,
            video.width(),
            video.height(),
            Flags::BILINEAR,
        )?;

        let resampler = match &audio {
            Some(audio) => Some(Resampler::get(
                audio.format(),
                audio.channel_layout(),
                audio.rate(),
                Sample::F32(ffmpeg_next::util::format::sample::Type::Packed),
                ChannelLayout::STEREO,
                clock.sample_rate(),
            )?),
            None => None,
        };

        Ok(Self {
            input,
            video,
            audio,
            scaler,
            resampler,
            video_stream,
            audio_stream,
            video_time_base,
            frames_tx,
            ring,
            commands,
            clock,
            stop,
            paused: true,
            pending_seek: None,
            at_eof: false,
            scratch_video: RawVideo::empty(),
            scratch_rgba: RawVideo::empty(),
            scratch_audio: RawAudio::empty(),
        })
    }

    fn run(&mut self) -> Result<()> {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            if let Flow::Exit = self.poll_commands() {
                return Ok(());
            }
            if let Some(target) = self.pending_seek.take() {
                self.apply_seek(target);
            }

            // Nothing to do until a resume or seek arrives.
            if self.paused || self.at_eof {
                thread::sleep(Duration::from_millis(10));
                continue;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    let index = packet.stream();
                    if index == self.video_stream {
                        if let Flow::Exit = self.forward_video(&packet)? {
                            return Ok(());
                        }
                    } else if Some(index) == self.audio_stream {
                        self.forward_audio(&packet)?;
                    }
                }
                Err(ffmpeg_next::Error::Eof) => {
                    self.at_eof = true;
                }
                // Corrupted packet; keep going.
                Err(_) => {}
            }
        }

        self.flush_tail()
    }

    fn poll_commands(&mut self) -> Flow {
        loop {
            match self.commands.try_recv() {
                Ok(WorkerCommand::Shutdown) => return Flow::Exit,
                Ok(WorkerCommand::Pause) => {
                    self.paused = true;
                    self.clock.hold();
                }
                Ok(WorkerCommand::Play) => {
                    self.paused = false;
                    self.clock.run();
                }
                Ok(WorkerCommand::Seek(target)) => {
                    self.pending_seek = Some(target);
                }
                Err(TryRecvError::Empty) => return Flow::Continue,
                Err(TryRecvError::Disconnected) => return Flow::Exit,
            }
        }
    }

    fn apply_seek(&mut self, target: f64) {
        let target_ts = (target * ffmpeg_next::ffi::AV_TIME_BASE as f64) as i64;
        if self.input.seek(target_ts, ..target_ts).is_ok() {
            self.video.flush();
            if let Some(audio) = &mut self.audio {
                audio.flush();
            }
            self.clock.set_seconds(target);
            self.at_eof = false;
        } else {
            log::warn!("seek to {target:.3}s failed");
        }
    }

    fn forward_video(&mut self, packet: &Packet) -> Result<Flow> {
        self.video.send_packet(packet)?;

        while self.video.receive_frame(&mut self.scratch_video).is_ok() {
            self.scaler.run(&self.scratch_video, &mut self.scratch_rgba)?;

            let pts = self.scratch_video.pts().unwrap_or(0);
            let frame = VideoFrame {
                rgba: self.scratch_rgba.data(0).to_vec(),
                width: self.scratch_rgba.width(),
                height: self.scratch_rgba.height(),
                pts: pts as f64 * f64::from(self.video_time_base),
            };

            match self.deliver(frame) {
                DeliverOutcome::Sent => {}
                DeliverOutcome::Abandoned => break,
                DeliverOutcome::Exit => return Ok(Flow::Exit),
            }
        }

        Ok(Flow::Continue)
    }

    /// Push a frame into the bounded channel without ever going deaf to
    /// commands: seek and shutdown must preempt a blocked send.
    fn deliver(&mut self, mut frame: VideoFrame) -> DeliverOutcome {
        loop {
            loop {
                match self.commands.try_recv() {
                    Ok(WorkerCommand::Shutdown) => return DeliverOutcome::Exit,
                    Ok(WorkerCommand::Pause) => {
                        self.paused = true;
                        self.clock.hold();
                    }
                    Ok(WorkerCommand::Play) => {
                        self.paused = false;
                        self.clock.run();
                    }
                    Ok(WorkerCommand::Seek(target)) => {
                        self.pending_seek = Some(target);
                        return DeliverOutcome::Abandoned;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return DeliverOutcome::Exit,
                }
            }

            match self.frames_tx.try_send(frame) {
                Ok(()) => return DeliverOutcome::Sent,
                Err(TrySendError::Full(returned)) => {
                    frame = returned;
                    thread::sleep(Duration::from_millis(1));
                }
                Err(TrySendError::Disconnected(_)) => return DeliverOutcome::Exit,
            }
        }
    }

    fn forward_audio(&mut self, packet: &Packet) -> Result<()> {
        let (Some(audio), Some(resampler)) = (&mut self.audio, &mut self.resampler) else {
            return Ok(());
        };

        audio.send_packet(packet)?;
        while audio.receive_frame(&mut self.scratch_audio).is_ok() {
            let mut resampled = RawAudio::empty();
            if resampler.run(&self.scratch_audio, &mut resampled).is_ok() {
                let data = resampled.data(0);
                // SAFETY: the resampler was configured for packed f32
                // output, so plane 0 is a contiguous interleaved f32 buffer
                // whose byte length is a multiple of 4.
                let samples: &[f32] = unsafe {
                    std::slice::from_raw_parts(data.as_ptr().cast::<f32>(), data.len() / 4)
                };
                self.ring.write(samples);
            }
        }

        Ok(())
    }

    /// Drain both decoders at end of input.
    fn flush_tail(&mut self) -> Result<()> {
        self.video.send_eof()?;
        while self.video.receive_frame(&mut self.scratch_video).is_ok() {
            self.scaler.run(&self.scratch_video, &mut self.scratch_rgba)?;
            let pts = self.scratch_video.pts().unwrap_or(0);
            let frame = VideoFrame {
                rgba: self.scratch_rgba.data(0).to_vec(),
                width: self.scratch_rgba.width(),
                height: self.scratch_rgba.height(),
                pts: pts as f64 * f64::from(self.video_time_base),
            };
            let _ = self.frames_tx.send(frame);
        }

        if let Some(audio) = &mut self.audio {
            audio.send_eof()?;
            while audio.receive_frame(&mut self.scratch_audio).is_ok() {}
        }

        Ok(())
    }
}
