use std::{io, path::PathBuf};

use eframe::egui;
use log::info;

use crate::config::Config;

use super::SelectorApp;

pub fn run_native() -> Result<(), eframe::Error> {
    env_logger::init();

    let config: Config = match std::fs::File::open("config.json") {
        Ok(f) => serde_json::from_reader(f).map_err(|e| eframe::Error::AppCreation(Box::new(e)))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(e) => Err(eframe::Error::AppCreation(Box::new(e)))?,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.egui.viewport)
            .with_title("Polygon selector"),
        ..Default::default()
    };

    let image = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.image.clone());

    info!("Run with config: {config:?}");
    eframe::run_native(
        "Polygon selector",
        options,
        Box::new(move |cc| Ok(Box::new(SelectorApp::new(cc, &config, image)))),
    )
}
