use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "cfst-panel.json";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// File names and tool parameters. Every field has a default, so a partial
/// JSON file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the tool runs in; relative paths below resolve against it.
    #[serde(skip)]
    pub work_dir: PathBuf,
    pub executable: String,
    pub ip_file: String,
    pub region_csv: String,
    pub region_ok: String,
    pub result_csv: String,
    pub probe_url: String,
    pub test_port: u16,
    pub scan_threads: u32,
    pub speed_threads: u32,
    pub max_display_rows: usize,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            executable: if cfg!(windows) { "cfst.exe" } else { "cfst" }.to_string(),
            ip_file: "ip.txt".to_string(),
            region_csv: "region.csv".to_string(),
            region_ok: "region_ok.txt".to_string(),
            result_csv: "result.csv".to_string(),
            probe_url: "https://cf.xiu2.xyz/url".to_string(),
            test_port: 443,
            scan_threads: 50,
            speed_threads: 100,
            max_display_rows: 10,
            poll_interval_ms: 200,
        }
    }
}

impl Config {
    /// Parse a config file, keeping `work_dir` as given.
    pub fn from_file(path: &Path, work_dir: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.work_dir = work_dir.to_path_buf();
        config.scan_threads = config.scan_threads.clamp(1, 1000);
        config.speed_threads = config.speed_threads.max(1);
        Ok(config)
    }

    /// Load `cfst-panel.json` from `work_dir` if present. Problems are
    /// logged and the defaults used instead.
    pub fn load(work_dir: &Path) -> Self {
        let path = work_dir.join(CONFIG_FILE);
        let defaults = Config {
            work_dir: work_dir.to_path_buf(),
            ..Config::default()
        };
        if !path.is_file() {
            return defaults;
        }
        match Self::from_file(&path, work_dir) {
            Ok(config) => {
                log::info!("using settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("ignoring settings file: {e:#}");
                defaults
            }
        }
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    pub fn executable_path(&self) -> PathBuf {
        self.resolve(&self.executable)
    }

    pub fn ip_file_path(&self) -> PathBuf {
        self.resolve(&self.ip_file)
    }

    pub fn region_csv_path(&self) -> PathBuf {
        self.resolve(&self.region_csv)
    }

    pub fn region_ok_path(&self) -> PathBuf {
        self.resolve(&self.region_ok)
    }

    pub fn result_csv_path(&self) -> PathBuf {
        self.resolve(&self.result_csv)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}
