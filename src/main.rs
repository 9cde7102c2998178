mod app;
mod color;
mod config;
mod data;
mod insight;
mod state;
mod ui;
mod view;

use app::PovertyDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Poverty Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(PovertyDashboardApp::new(cc, &config)))),
    )
}
