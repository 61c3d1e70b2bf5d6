use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::config::Config;

/// One invocation of the speed-test tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Discovery pass over the candidate IP list, emits per-IP colo codes.
    Scan { threads: u32 },
    /// Measurement pass over the exported region list.
    SpeedTest,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Scan { .. } => f.write_str("scan"),
            Job::SpeedTest => f.write_str("speed test"),
        }
    }
}

impl Job {
    /// Command-line arguments, excluding the program itself.
    pub fn args(&self, config: &Config) -> Vec<OsString> {
        match self {
            Job::Scan { threads } => vec![
                "-n".into(),
                threads.to_string().into(),
                "-tp".into(),
                config.test_port.to_string().into(),
                "-url".into(),
                config.probe_url.clone().into(),
                "-httping".into(),
                "-dd".into(),
                "-f".into(),
                config.ip_file_path().into(),
                "-o".into(),
                config.region_csv_path().into(),
            ],
            Job::SpeedTest => vec![
                "-n".into(),
                config.speed_threads.to_string().into(),
                "-tp".into(),
                config.test_port.to_string().into(),
                "-f".into(),
                config.region_ok_path().into(),
                "-o".into(),
                config.result_csv_path().into(),
            ],
        }
    }

    /// Files that must exist before the tool is started.
    pub fn required_files(&self, config: &Config) -> Vec<PathBuf> {
        let input = match self {
            Job::Scan { .. } => config.ip_file_path(),
            Job::SpeedTest => config.region_ok_path(),
        };
        vec![config.executable_path(), input]
    }

    /// File the tool writes when it completes.
    pub fn output_path(&self, config: &Config) -> PathBuf {
        match self {
            Job::Scan { .. } => config.region_csv_path(),
            Job::SpeedTest => config.result_csv_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn config() -> Config {
        Config {
            work_dir: PathBuf::from("/work"),
            ..Config::default()
        }
    }

    #[test]
    fn scan_arguments() {
        let cfg = config();
        let args = strings(Job::Scan { threads: 64 }.args(&cfg));
        let region = cfg.region_csv_path().to_string_lossy().into_owned();
        let ip = cfg.ip_file_path().to_string_lossy().into_owned();
        assert_eq!(
            args,
            [
                "-n", "64", "-tp", "443", "-url", "https://cf.xiu2.xyz/url", "-httping", "-dd",
                "-f", ip.as_str(), "-o", region.as_str(),
            ]
        );
    }

    #[test]
    fn speed_test_arguments() {
        let cfg = config();
        let args = strings(Job::SpeedTest.args(&cfg));
        assert_eq!(&args[..4], ["-n", "100", "-tp", "443"]);
        assert_eq!(args[4], "-f");
        assert!(args[5].ends_with("region_ok.txt"));
        assert_eq!(args[6], "-o");
        assert!(args[7].ends_with("result.csv"));
    }

    #[test]
    fn required_files_per_job() {
        let cfg = config();
        let scan = Job::Scan { threads: 1 }.required_files(&cfg);
        assert!(scan[1].ends_with("ip.txt"));
        let speed = Job::SpeedTest.required_files(&cfg);
        assert!(speed[1].ends_with("region_ok.txt"));
        assert_eq!(scan[0], speed[0]);
    }
}
