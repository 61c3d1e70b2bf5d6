use eframe::egui;

use crate::config::Config;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CfstApp {
    pub state: AppState,
}

impl CfstApp {
    pub fn new(config: Config) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for CfstApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.tick();
        if self.state.needs_wakeup() {
            ctx.request_repaint_after(self.state.config.poll_interval());
        }

        // ---- Top panel: menu bar and scan controls ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
            panels::controls(ui, &mut self.state);
        });

        // ---- Bottom panels: status line, speed test button ----
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            panels::status_bar(ui, &self.state);
        });
        egui::TopBottomPanel::bottom("speed_row").show(ctx, |ui| {
            panels::speed_row(ui, &mut self.state);
        });

        // ---- Right side panel: region chart ----
        egui::SidePanel::right("region_chart")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::region_chart(ui, &self.state);
            });

        // ---- Region list above the results ----
        egui::TopBottomPanel::top("region_list")
            .default_height(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::region_list(ui, &mut self.state);
            });

        // ---- Central panel: results table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::results_table(ui, &mut self.state);
        });

        panels::alert_window(ctx, &mut self.state);
    }
}
