use egui::{Slider, Ui};

use crate::input::toggle_play;
use crate::player::{PlaybackSurface, SpeedSelection, VideoPlayer, SPEED_PRESETS};

/// What the control bar asked the app shell to do this frame.
#[derive(Default)]
pub struct ControlBarResponse {
    pub toggle_fullscreen: bool,
}

/// Bottom transport bar: play/pause, seek slider, time labels, volume,
/// speed preset menu, fullscreen toggle.
pub struct ControlBar;

impl ControlBar {
    pub fn show(
        ui: &mut Ui,
        player: &mut VideoPlayer,
        speeds: &mut SpeedSelection,
    ) -> ControlBarResponse {
        let mut response = ControlBarResponse::default();

        ui.horizontal(|ui| {
            let play_pause = if player.is_paused() { "▶" } else { "⏸" };
            if ui.button(play_pause).clicked() {
                toggle_play(player);
            }

            ui.separator();

            let duration = player.duration();
            let position = player.position();

            ui.label(format_clock(position));

            // Remember the dragged position so the knob doesn't fight the
            // clock mid-drag.
            let slider_id = ui.id().with("seek_slider");
            let mut slider_pos = ui.memory(|mem| {
                mem.data.get_temp::<f64>(slider_id).unwrap_or(position)
            });

            let slider = ui.add(
                Slider::new(&mut slider_pos, 0.0..=duration.max(0.0))
                    .show_value(false)
                    .trailing_fill(true),
            );

            if slider.dragged() {
                ui.memory_mut(|mem| mem.data.insert_temp(slider_id, slider_pos));
            } else if !player.is_seeking() {
                ui.memory_mut(|mem| mem.data.insert_temp(slider_id, position));
            }

            if slider.drag_stopped() || slider.clicked() {
                player.seek(slider_pos);
            }

            ui.label(format_clock(duration));

            ui.separator();

            ui.label("🔊");
            let mut volume = player.volume();
            if ui
                .add(Slider::new(&mut volume, 0.0..=1.0).show_value(false))
                .changed()
            {
                player.set_volume(volume);
            }

            ui.separator();

            // Speed preset menu; arrows step through the same list.
            let mut selected = speeds.rate();
            egui::ComboBox::from_id_salt("speed_menu")
                .selected_text(format_rate(selected))
                .width(64.0)
                .show_ui(ui, |ui| {
                    for &preset in &SPEED_PRESETS {
                        ui.selectable_value(&mut selected, preset, format_rate(preset));
                    }
                });
            if selected != speeds.rate() {
                speeds.select(selected);
                player.set_playback_rate(speeds.rate());
            }

            ui.separator();

            if ui
                .button("⛶")
                .on_hover_text("Fullscreen (F, double-click video)")
                .clicked()
            {
                response.toggle_fullscreen = true;
            }
        });

        response
    }
}

fn format_rate(rate: f64) -> String {
    format!("{rate}×")
}

fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() { seconds.max(0.0) as u64 } else { 0 };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
