use std::path::PathBuf;

use egui::{Color32, Vec2};
use poly_select::NotifyMode;

#[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Image opened at startup, the first command line argument takes precedence
    pub image: Option<PathBuf>,
    pub notify: NotifyMode,
    /// Radius of control point handles in screen pixels, also the hit tolerance
    pub control_point_radius: f32,
    pub colors: Colors,
    pub egui: EguiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: None,
            notify: NotifyMode::Queued,
            control_point_radius: 4.0,
            colors: Default::default(),
            egui: Default::default(),
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq, Clone, Copy)]
#[serde(default)]
pub struct Colors {
    pub perimeter: [u8; 3],
    pub live_wire: [u8; 3],
    pub control_point: [u8; 3],
    pub move_guide: [u8; 3],
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            perimeter: [0, 0, 255],
            live_wire: [255, 255, 0],
            control_point: [0, 255, 255],
            move_guide: [255, 0, 0],
        }
    }
}

pub(crate) fn color([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

#[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq)]
#[serde(default)]
pub struct EguiConfig {
    pub viewport: Vec2,
}

impl Default for EguiConfig {
    fn default() -> Self {
        Self {
            viewport: [900.0, 700.0].into(),
        }
    }
}
