use std::time::Duration;

use eframe::egui::{self, Label, Layout, Sense, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::normalize::display_text;
use crate::state::AppState;

const HEADERS: [&str; 4] = ["IP address", "Avg latency", "Download", "Colo"];

// ---------------------------------------------------------------------------
// Speed test results (central panel)
// ---------------------------------------------------------------------------

/// Render the result table. Double-clicking a cell copies its text.
pub fn results_table(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Speed test results (double-click a cell to copy)");

    if state.results.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No results yet. Pick a region, then press Speed test.");
        });
        return;
    }

    let mut copied: Option<String> = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::centered_and_justified(egui::Direction::LeftToRight))
        .column(Column::initial(118.0).at_least(60.0))
        .column(Column::initial(68.0).at_least(40.0))
        .column(Column::initial(80.0).at_least(40.0))
        .column(Column::remainder().at_least(40.0))
        .header(22.0, |mut header| {
            for title in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row in &state.results {
                let cells = [
                    row.ip.clone(),
                    display_text(&row.latency),
                    display_text(&row.download),
                    row.region_code.clone(),
                ];
                body.row(20.0, |mut table_row| {
                    for text in cells {
                        table_row.col(|ui: &mut Ui| {
                            let resp = ui.add(Label::new(text.as_str()).sense(Sense::click()));
                            if resp.double_clicked() {
                                copied = Some(text.clone());
                            }
                        });
                    }
                });
            }
        });

    if let Some(text) = copied {
        ui.ctx().copy_text(text.clone());
        log::debug!("copied {text:?} to clipboard");
        state.flash_status(format!("Copied: {text}"), Duration::from_millis(1500));
    }
}
