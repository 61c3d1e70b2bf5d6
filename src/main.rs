mod app;
mod color;
mod config;
mod data;
mod runner;
mod state;
mod ui;

use std::path::PathBuf;

use app::CfstApp;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let work_dir = std::env::current_dir().unwrap_or_else(|e| {
        log::warn!("cannot read current directory ({e}), using '.'");
        PathBuf::from(".")
    });
    let config = Config::load(&work_dir);
    log::info!("working directory {}", work_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CFST Panel",
        options,
        Box::new(|_cc| Ok(Box::new(CfstApp::new(config)))),
    )
}
