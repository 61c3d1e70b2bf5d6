use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::RegionSummary;

// ---------------------------------------------------------------------------
// Region code → Color32
// ---------------------------------------------------------------------------

/// One colour per region, assigned in ranking order so the list and the
/// chart agree. Hues are spaced evenly around the wheel.
#[derive(Debug, Clone, Default)]
pub struct RegionColors {
    mapping: BTreeMap<String, Color32>,
}

impl RegionColors {
    pub fn new(regions: &[RegionSummary]) -> Self {
        let step = 360.0 / regions.len().max(1) as f32;
        let mapping = regions
            .iter()
            .enumerate()
            .map(|(rank, r)| (r.code.clone(), hue_color(rank as f32 * step)))
            .collect();
        RegionColors { mapping }
    }

    pub fn color_for(&self, code: &str) -> Color32 {
        self.mapping.get(code).copied().unwrap_or(Color32::GRAY)
    }
}

fn hue_color(hue: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, 0.70, 0.50).into_color();
    let [r, g, b] = [rgb.red, rgb.green, rgb.blue].map(|c| (c * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}
