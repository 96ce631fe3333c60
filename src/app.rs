use std::path::PathBuf;
use std::time::Instant;

use egui::{CentralPanel, Color32, Event, TopBottomPanel, Vec2, ViewportCommand};

use crate::input::{GestureCtx, GestureKey, KeyboardGestures, TouchpadGestures};
use crate::player::{PlaybackSurface, SpeedSelection, VideoPlayer};
use crate::settings::Settings;
use crate::ui::controls::ControlBar;
use crate::ui::overlay::{OverlayFeedback, OverlayState};

/// Application shell: owns the (optional) player, the gesture handlers and
/// the transient overlay state, and routes raw egui input into the gesture
/// core every frame.
pub struct PlayerApp {
    player: Option<VideoPlayer>,
    error_message: Option<String>,

    keyboard: KeyboardGestures,
    touchpad: TouchpadGestures,
    speeds: SpeedSelection,
    overlay: OverlayState,
    settings: Settings,

    pending_open: Option<PathBuf>,
}

impl PlayerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, initial_file: Option<PathBuf>) -> Self {
        let settings = Settings::load();
        Self {
            player: None,
            error_message: None,
            keyboard: KeyboardGestures::new(),
            touchpad: TouchpadGestures::new(),
            speeds: SpeedSelection::from_rate(settings.playback_rate),
            overlay: OverlayState::new(),
            settings,
            pending_open: initial_file,
        }
    }

    fn open_file_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Video", &["mp4", "mkv", "avi", "mov", "webm", "flv", "wmv"])
            .pick_file()
        {
            self.load_video(path, ctx);
        }
    }

    fn load_video(&mut self, path: PathBuf, ctx: &egui::Context) {
        // No stale session may touch the new surface.
        self.keyboard.reset();
        self.overlay.clear();
        self.error_message = None;

        match VideoPlayer::open(&path, ctx.clone()) {
            Ok(mut player) => {
                player.set_volume(self.settings.volume);
                player.set_playback_rate(self.speeds.rate());
                self.player = Some(player);
                log::info!("opened {}", path.display());
            }
            Err(err) => {
                log::error!("failed to open {}: {err:#}", path.display());
                self.error_message = Some(format!("Failed to open video: {err:#}"));
            }
        }
    }

    /// Route key and wheel events into the gesture core, dropping consumed
    /// events so nothing else in egui reacts to them, then pump the
    /// gesture deadlines.
    fn route_input(&mut self, ctx: &egui::Context, now: Instant) {
        ctx.input_mut(|input| {
            input.events.retain(|event| {
                let mut feedback = OverlayFeedback {
                    overlay: &mut self.overlay,
                    now,
                };
                let mut gctx = GestureCtx {
                    surface: self
                        .player
                        .as_mut()
                        .map(|p| p as &mut dyn PlaybackSurface),
                    speeds: &mut self.speeds,
                    feedback: &mut feedback,
                };

                let consumed = match event {
                    Event::Key { key, pressed, .. } => match GestureKey::from_egui(*key) {
                        Some(key) if *pressed => self.keyboard.on_key_down(key, now, &mut gctx),
                        Some(key) => self.keyboard.on_key_up(key, now, &mut gctx),
                        None => false,
                    },
                    Event::MouseWheel { delta, .. } => {
                        self.touchpad.on_wheel(delta.x, delta.y, &mut gctx)
                    }
                    _ => false,
                };
                !consumed
            });
        });

        let mut feedback = OverlayFeedback {
            overlay: &mut self.overlay,
            now,
        };
        let mut gctx = GestureCtx {
            surface: self
                .player
                .as_mut()
                .map(|p| p as &mut dyn PlaybackSurface),
            speeds: &mut self.speeds,
            feedback: &mut feedback,
        };
        self.keyboard.tick(now, &mut gctx);
    }

    fn set_fullscreen(&self, ctx: &egui::Context, on: bool) {
        ctx.send_viewport_cmd(ViewportCommand::Fullscreen(on));
    }

    fn draw_badges(&self, ctx: &egui::Context, now: Instant) {
        if self.overlay.warp_active() {
            egui::Area::new(egui::Id::new("warp_badge"))
                .anchor(egui::Align2::CENTER_TOP, [0.0, 16.0])
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(egui::RichText::new("2× ▶▶").strong());
                    });
                });
        }

        if self.overlay.speed_badge_visible(now) {
            egui::Area::new(egui::Id::new("speed_badge"))
                .anchor(egui::Align2::RIGHT_TOP, [-16.0, 16.0])
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(egui::RichText::new(format!("{}×", self.speeds.rate())).strong());
                    });
                });
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if let Some(path) = self.pending_open.take() {
            self.load_video(path, ctx);
        }

        self.route_input(ctx, now);

        // Pointer activity keeps the controls up.
        let pointer_moved = ctx.input(|i| i.pointer.delta() != Vec2::ZERO);
        if pointer_moved {
            self.overlay.show_controls(now);
        }

        // Fullscreen: F or double-click toggles, Escape leaves.
        let fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
        if ctx.input(|i| i.key_pressed(egui::Key::F)) {
            self.set_fullscreen(ctx, !fullscreen);
        }
        if fullscreen && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.set_fullscreen(ctx, false);
        }

        if !fullscreen {
            TopBottomPanel::top("menu_bar").show(ctx, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("Open...").clicked() {
                            ui.close_menu();
                            self.open_file_dialog(ctx);
                        }
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(ViewportCommand::Close);
                        }
                    });
                });
            });
        }

        let controls_up = self
            .player
            .as_ref()
            .map(|p| p.is_paused() || self.overlay.controls_visible(now))
            .unwrap_or(false);
        let mut toggle_fullscreen = false;
        if controls_up {
            TopBottomPanel::bottom("controls").show(ctx, |ui| {
                if let Some(player) = &mut self.player {
                    let response = ControlBar::show(ui, player, &mut self.speeds);
                    if response.toggle_fullscreen {
                        toggle_fullscreen = true;
                    }
                }
            });
        }
        CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                if let Some(player) = &mut self.player {
                    player.update(ctx);

                    let texture_id = player.texture().map(|t| t.id());
                    let (width, height) = player.video_size();

                    if let Some(texture_id) = texture_id {
                        let available = ui.available_size();
                        let aspect = width as f32 / height.max(1) as f32;
                        let available_aspect = available.x / available.y.max(1.0);

                        // Fit while keeping aspect ratio.
                        let display = if aspect > available_aspect {
                            Vec2::new(available.x, available.x / aspect)
                        } else {
                            Vec2::new(available.y * aspect, available.y)
                        };

                        ui.centered_and_justified(|ui| {
                            let response = ui.image((texture_id, display));
                            if response.double_clicked() {
                                toggle_fullscreen = true;
                            }
                        });
                    }
                } else {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(ui.available_height() / 3.0);

                            if let Some(err) = &self.error_message {
                                ui.colored_label(Color32::RED, err);
                                ui.add_space(20.0);
                            }

                            ui.heading("No video loaded");
                            ui.add_space(10.0);

                            if ui.button("Open Video File...").clicked() {
                                self.open_file_dialog(ctx);
                            }

                            ui.add_space(10.0);
                            ui.label("Or drag and drop a video file");
                        });
                    });
                }
            });
        if toggle_fullscreen {
            self.set_fullscreen(ctx, !fullscreen);
        }

        self.draw_badges(ctx, now);

        // Handle file drops.
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .first()
                .and_then(|file| file.path.clone())
        });
        if let Some(path) = dropped {
            self.load_video(path, ctx);
        }

        // Keep frames coming while playback, a key session, or an overlay
        // deadline needs them.
        let playing = self.player.as_ref().map(|p| !p.is_paused()).unwrap_or(false);
        if playing || self.keyboard.is_active() {
            ctx.request_repaint();
        } else if let Some(delay) = self.overlay.next_deadline(now) {
            ctx.request_repaint_after(delay);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.keyboard.reset();
        self.settings.playback_rate = self.speeds.rate();
        if let Some(player) = &self.player {
            self.settings.volume = player.volume();
        }
        if let Err(err) = self.settings.save() {
            log::warn!("failed to save settings: {err:#}");
        }
    }
}
