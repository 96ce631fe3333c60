use clap::Parser;
use eframe::NativeOptions;
use std::path::PathBuf;

use playhead::PlayerApp;

/// Minimal video player with press-and-hold transport gestures.
#[derive(Parser)]
#[command(name = "playhead", version, about)]
struct Cli {
    /// Video file to open on startup.
    file: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    ffmpeg_next::init().expect("Failed to initialize FFmpeg");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Playhead",
        options,
        Box::new(move |cc| Ok(Box::new(PlayerApp::new(cc, cli.file)))),
    )
}
