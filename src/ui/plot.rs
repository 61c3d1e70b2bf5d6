use eframe::egui::{Stroke, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Region distribution chart (right panel)
// ---------------------------------------------------------------------------

/// Bar per region, ranked left to right, height = available IPs.
pub fn region_chart(ui: &mut Ui, state: &AppState) {
    if state.regions.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Region distribution appears here after Region stats.");
        });
        return;
    }

    let bars: Vec<Bar> = state
        .regions
        .iter()
        .enumerate()
        .map(|(i, region)| {
            let color = state.region_colors.color_for(&region.code);
            let mut bar = Bar::new((i + 1) as f64, region.ip_count as f64)
                .name(format!("{} [{}]", region.display_name, region.code))
                .fill(color)
                .width(0.7);
            if state.selected_region == Some(i) {
                bar = bar.stroke(Stroke::new(2.0, ui.visuals().strong_text_color()));
            }
            bar
        })
        .collect();

    Plot::new("region_chart")
        .x_axis_label("Rank")
        .y_axis_label("IPs")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
