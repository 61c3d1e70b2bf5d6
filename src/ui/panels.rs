use eframe::egui::{self, Align2, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

const SCAN_FILL: Color32 = Color32::from_rgb(0x2e, 0xcc, 0x71);
const STATS_FILL: Color32 = Color32::from_rgb(0xf3, 0x9c, 0x12);
const SPEED_FILL: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);

fn action_button(text: &str, fill: Color32, size: [f32; 2]) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).color(Color32::WHITE).size(15.0))
        .fill(fill)
        .min_size(size.into())
}

/// Callback for the watcher thread: wake the UI when the tool exits.
fn repaint_on_exit(ui: &Ui) -> impl Fn() + Send + 'static {
    let ctx = ui.ctx().clone();
    move || ctx.request_repaint()
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open region file…").clicked() {
                if let Some(path) = pick_csv("Open discovery output") {
                    state.load_regions_from(&path);
                }
                ui.close_menu();
            }
            if ui.button("Open result file…").clicked() {
                if let Some(path) = pick_csv("Open speed test output") {
                    state.load_results_from(&path);
                }
                ui.close_menu();
            }
            if ui.button("Reload results").clicked() {
                state.load_results();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(job) = state.launcher.current_job() {
            ui.spinner();
            ui.label(format!("{job} running"));
        } else {
            ui.label(format!(
                "{} regions, {} results",
                state.regions.len(),
                state.results.len()
            ));
        }
    });
}

fn pick_csv(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("CSV", &["csv"])
        .add_filter("All files", &["*"])
        .pick_file()
}

// ---------------------------------------------------------------------------
// Scan / statistics controls
// ---------------------------------------------------------------------------

pub fn controls(ui: &mut Ui, state: &mut AppState) {
    let idle = !state.is_busy();

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        let width = 160.0 * 2.0 + 8.0;
        ui.add_space(((ui.available_width() - width) / 2.0).max(0.0));

        let scan = ui.add_enabled(idle, action_button("Scan", SCAN_FILL, [160.0, 36.0]));
        if scan.clicked() {
            state.start_scan(repaint_on_exit(ui));
        }
        ui.add_space(8.0);
        if ui
            .add(action_button("Region stats", STATS_FILL, [160.0, 36.0]))
            .clicked()
        {
            state.compute_regions();
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        ui.add_space(((ui.available_width() - 160.0) / 2.0).max(0.0));
        ui.label("Scan threads");
        ui.add_enabled(
            idle,
            egui::DragValue::new(&mut state.scan_threads).range(1..=1000),
        );
    });
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Region list
// ---------------------------------------------------------------------------

pub fn region_list(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Region statistics");

    if state.regions.is_empty() {
        ui.label("No statistics yet. Run a scan, then press Region stats.");
        return;
    }

    let mut clicked = None;
    let mut activated = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height((ui.available_height() - 24.0).max(40.0))
        .show(ui, |ui: &mut Ui| {
            for (i, region) in state.regions.iter().enumerate() {
                let color = state.region_colors.color_for(&region.code);
                let text = RichText::new(region.label(i + 1)).color(color);
                let resp = ui.selectable_label(state.selected_region == Some(i), text);
                if resp.double_clicked() {
                    activated = Some(i);
                } else if resp.clicked() {
                    clicked = Some(i);
                }
            }
        });

    if let Some(i) = clicked {
        state.selected_region = Some(i);
    }
    if let Some(i) = activated {
        state.export_region(i);
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Double-click a region to load it, then press Speed test.");
        if let Some(i) = state.selected_region {
            if ui.small_button("Use region").clicked() {
                state.export_region(i);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Speed test button / status bar / alerts
// ---------------------------------------------------------------------------

pub fn speed_row(ui: &mut Ui, state: &mut AppState) {
    let idle = !state.is_busy();
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(4.0);
        let speed = ui.add_enabled(idle, action_button("Speed test", SPEED_FILL, [120.0, 36.0]));
        if speed.clicked() {
            state.start_speed_test(repaint_on_exit(ui));
        }
        ui.add_space(4.0);
    });
}

pub fn status_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(&state.status);
    });
}

/// Modal-style window for the pending alert, if any.
pub fn alert_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(alert) = state.alert.clone() else {
        return;
    };
    let mut dismissed = false;
    egui::Window::new(alert.title)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(alert.message);
            ui.add_space(6.0);
            ui.vertical_centered(|ui: &mut Ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });
    if dismissed {
        state.alert = None;
    }
}
