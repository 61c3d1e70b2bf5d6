use std::path::Path;
use std::time::{Duration, Instant};

use crate::color::RegionColors;
use crate::config::Config;
use crate::data::loader;
use crate::data::model::{RegionSummary, ResultRow};
use crate::data::region::export_selection;
use crate::runner::launcher::preflight;
use crate::runner::{Completion, Job, LaunchError, Launcher};

pub const READY: &str = "Ready";

// ---------------------------------------------------------------------------
// Alert – a message the user has to acknowledge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// Owner of the single outstanding tool process.
    pub launcher: Launcher,

    /// Thread count passed to the discovery pass.
    pub scan_threads: u32,

    /// Region statistics, ranked by IP count.
    pub regions: Vec<RegionSummary>,
    pub region_colors: RegionColors,
    pub selected_region: Option<usize>,

    /// Rows of the last measurement pass.
    pub results: Vec<ResultRow>,

    /// Status bar text.
    pub status: String,
    status_reset_at: Option<Instant>,

    /// Modal message, shown until dismissed.
    pub alert: Option<Alert>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            launcher: Launcher::new(config.poll_interval()),
            scan_threads: config.scan_threads,
            config,
            regions: Vec::new(),
            region_colors: RegionColors::default(),
            selected_region: None,
            results: Vec::new(),
            status: READY.to_string(),
            status_reset_at: None,
            alert: None,
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_reset_at = None;
    }

    /// Show `msg` and go back to "Ready" after `ttl`.
    pub fn flash_status(&mut self, msg: impl Into<String>, ttl: Duration) {
        self.status = msg.into();
        self.status_reset_at = Some(Instant::now() + ttl);
    }

    fn raise_alert(&mut self, title: &str, message: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.to_string(),
            message: message.into(),
        });
    }

    pub fn is_busy(&self) -> bool {
        self.launcher.is_running()
    }

    /// Whether the UI has to repaint without user input.
    pub fn needs_wakeup(&self) -> bool {
        self.is_busy() || self.status_reset_at.is_some()
    }

    /// Per-frame housekeeping: expire flashed status text and pick up a
    /// finished run.
    pub fn tick(&mut self) {
        if self.status_reset_at.is_some_and(|at| Instant::now() >= at) {
            self.set_status(READY);
        }
        if let Some(done) = self.launcher.poll() {
            self.on_completion(done);
        }
    }

    // ---- Discovery pass ----

    /// Start the discovery pass. `notify` runs on the watcher thread when
    /// the tool exits.
    pub fn start_scan<F>(&mut self, notify: F)
    where
        F: Fn() + Send + 'static,
    {
        let job = Job::Scan {
            threads: self.scan_threads.clamp(1, 1000),
        };
        match self.launcher.start(job, &self.config, notify) {
            Ok(()) => self.set_status("Scan running in a separate window…"),
            Err(e) => self.report_launch_error(job, e),
        }
    }

    /// Aggregate the discovery pass output into region statistics.
    pub fn compute_regions(&mut self) {
        let path = self.config.region_csv_path();
        if !path.is_file() {
            self.raise_alert(
                "Error",
                format!("{} not found, run a scan first", self.config.region_csv),
            );
            return;
        }
        self.load_regions_from(&path);
    }

    pub fn load_regions_from(&mut self, path: &Path) {
        match loader::load_regions(path) {
            Ok(regions) if regions.is_empty() => {
                self.set_regions(regions);
                self.raise_alert("Notice", format!("{} has no usable rows", path.display()));
            }
            Ok(regions) => {
                let n = regions.len();
                self.set_regions(regions);
                self.set_status(format!("Statistics done, {n} regions"));
            }
            Err(e) => {
                log::error!("failed to load regions: {e:#}");
                self.raise_alert("Error", format!("{e:#}"));
            }
        }
    }

    fn set_regions(&mut self, regions: Vec<RegionSummary>) {
        self.region_colors = RegionColors::new(&regions);
        self.regions = regions;
        self.selected_region = None;
    }

    /// Export the region at `idx` as the target list of the next
    /// measurement pass.
    pub fn export_region(&mut self, idx: usize) {
        let Some(region) = self.regions.get(idx) else {
            return;
        };
        self.selected_region = Some(idx);
        let path = self.config.region_ok_path();
        match export_selection(region, &path) {
            Ok(_) => {
                let msg = format!("{} IPs exported, press Speed test", region.display_name);
                self.set_status(msg);
            }
            Err(e) => {
                log::error!("export failed: {e:#}");
                self.raise_alert("Save failed", format!("{e:#}"));
            }
        }
    }

    // ---- Measurement pass ----

    pub fn start_speed_test<F>(&mut self, notify: F)
    where
        F: Fn() + Send + 'static,
    {
        let job = Job::SpeedTest;
        if let Some(current) = self.launcher.current_job() {
            self.report_launch_error(job, LaunchError::Busy(current));
            return;
        }
        if let Err(e) = preflight(job, &self.config) {
            self.report_launch_error(job, e);
            return;
        }

        let stale = self.config.result_csv_path();
        if stale.is_file() {
            if let Err(e) = std::fs::remove_file(&stale) {
                log::warn!("could not remove {}: {e}", stale.display());
            }
        }

        match self.launcher.start(job, &self.config, notify) {
            Ok(()) => self.set_status("Speed test running…"),
            Err(e) => self.report_launch_error(job, e),
        }
    }

    /// Fill the result table from the measurement pass output.
    pub fn load_results(&mut self) {
        let path = self.config.result_csv_path();
        if !path.is_file() {
            self.results.clear();
            self.set_status(format!("{} not found", path.display()));
            return;
        }
        self.load_results_from(&path);
    }

    pub fn load_results_from(&mut self, path: &Path) {
        let max = self.config.max_display_rows;
        match loader::load_results(path, max) {
            Ok(rows) if rows.is_empty() => {
                self.results.clear();
                self.set_status(format!("{} has no data rows", path.display()));
            }
            Ok(rows) => {
                let n = rows.len();
                self.results = rows;
                self.set_status(format!("Loaded {n} results (showing at most {max})"));
            }
            Err(e) => {
                log::error!("failed to load results: {e:#}");
                self.results.clear();
                self.set_status(format!("Loading failed: {e:#}"));
            }
        }
    }

    // ---- Completion ----

    fn on_completion(&mut self, done: Completion) {
        log::info!(
            "{} finished after {:.1?} with {}",
            done.job,
            done.elapsed,
            done.status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown status".to_string())
        );
        if !done.succeeded() {
            log::warn!("{} did not exit cleanly", done.job);
        }
        let output = done.job.output_path(&self.config);
        match done.job {
            Job::Scan { .. } if output.is_file() => {
                self.set_status("Scan finished, compute region statistics")
            }
            Job::Scan { .. } => self.set_status("Scan ended"),
            Job::SpeedTest if output.is_file() => self.load_results_from(&output),
            Job::SpeedTest => self.set_status("Speed test ended"),
        }
    }

    fn report_launch_error(&mut self, job: Job, e: LaunchError) {
        log::error!("cannot start {job}: {e:#}");
        let title = match e {
            LaunchError::MissingFiles(_) => "Missing files",
            LaunchError::Busy(_) => "Busy",
            LaunchError::NotFound(_) | LaunchError::Spawn { .. } => "Launch failed",
        };
        self.raise_alert(title, e.to_string());
        self.set_status(format!("{title}, {job} cancelled"));
    }
}
