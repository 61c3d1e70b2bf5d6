use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::job::Job;
use crate::config::Config;

// ---------------------------------------------------------------------------
// Errors and completion record
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("a {0} is still running")]
    Busy(Job),
    #[error("missing from the working directory: {}", .0.join(", "))]
    MissingFiles(Vec<String>),
    #[error("executable not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to start {}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Observed end of a run. `status` is `None` when the exit status could not
/// be read.
#[derive(Debug)]
pub struct Completion {
    pub job: Job,
    pub status: Option<ExitStatus>,
    pub elapsed: Duration,
}

impl Completion {
    pub fn succeeded(&self) -> bool {
        self.status.is_some_and(|s| s.success())
    }
}

// ---------------------------------------------------------------------------
// The single "current process" slot
// ---------------------------------------------------------------------------

struct Running {
    job: Job,
    child: Child,
    started: Instant,
}

/// The outstanding run. A process that has exited stays in the slot as
/// `Exited` until [`Launcher::poll`] hands its completion out, so a new run
/// cannot start before the previous one has been reported.
enum Current {
    Idle,
    Running(Running),
    Exited(Completion),
}

impl Current {
    fn job(&self) -> Option<Job> {
        match self {
            Current::Idle => None,
            Current::Running(running) => Some(running.job),
            Current::Exited(done) => Some(done.job),
        }
    }
}

type Slot = Arc<Mutex<Current>>;

fn lock(slot: &Mutex<Current>) -> MutexGuard<'_, Current> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Record the exit of the running process, if it has exited. Returns `true`
/// while it is still running.
fn reap(slot: &Mutex<Current>) -> bool {
    let mut guard = lock(slot);
    let Current::Running(running) = &mut *guard else {
        return false;
    };
    let status = match running.child.try_wait() {
        Ok(Some(status)) => Some(status),
        Ok(None) => return true,
        Err(e) => {
            log::warn!("could not read exit status of the {}: {e}", running.job);
            None
        }
    };
    let done = Completion {
        job: running.job,
        status,
        elapsed: running.started.elapsed(),
    };
    *guard = Current::Exited(done);
    false
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
    cmd.creation_flags(CREATE_NEW_CONSOLE);
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(any(windows, unix)))]
fn detach(_cmd: &mut Command) {}

/// Check that every file `job` needs is present.
pub fn preflight(job: Job, config: &Config) -> Result<(), LaunchError> {
    let missing: Vec<String> = job
        .required_files(config)
        .iter()
        .filter(|p| !p.is_file())
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LaunchError::MissingFiles(missing))
    }
}

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

/// Runs at most one external process at a time and reports when it exits.
///
/// Exit is detected by polling: a watcher thread checks every
/// `poll_interval` and wakes the UI, and the UI calls [`Launcher::poll`] on
/// each frame to collect the completion. There is no cancellation; a
/// process still running when the launcher is dropped keeps running.
pub struct Launcher {
    slot: Slot,
    poll_interval: Duration,
}

impl Launcher {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Current::Idle)),
            poll_interval,
        }
    }

    /// Job of the outstanding run, including one that has exited but whose
    /// completion has not been collected yet.
    pub fn current_job(&self) -> Option<Job> {
        lock(&self.slot).job()
    }

    pub fn is_running(&self) -> bool {
        self.current_job().is_some()
    }

    /// Check required files, then start the tool for `job` in the working
    /// directory. `notify` is called from the watcher thread on exit.
    pub fn start<F>(&self, job: Job, config: &Config, notify: F) -> Result<(), LaunchError>
    where
        F: Fn() + Send + 'static,
    {
        if let Some(current) = self.current_job() {
            return Err(LaunchError::Busy(current));
        }
        preflight(job, config)?;
        self.spawn(
            job,
            &config.executable_path(),
            &job.args(config),
            &config.work_dir,
            notify,
        )
    }

    /// Start `program` as the current process for `job`.
    pub fn spawn<F>(
        &self,
        job: Job,
        program: &Path,
        args: &[OsString],
        cwd: &Path,
        notify: F,
    ) -> Result<(), LaunchError>
    where
        F: Fn() + Send + 'static,
    {
        let mut slot = lock(&self.slot);
        if let Some(current) = slot.job() {
            return Err(LaunchError::Busy(current));
        }

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd);
        detach(&mut cmd);

        let child = cmd.spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LaunchError::NotFound(program.to_path_buf())
            } else {
                LaunchError::Spawn {
                    program: program.to_path_buf(),
                    source,
                }
            }
        })?;
        log::info!(
            "started {job} (pid {}): {} {:?} in {}",
            child.id(),
            program.display(),
            args,
            cwd.display()
        );

        *slot = Current::Running(Running {
            job,
            child,
            started: Instant::now(),
        });
        drop(slot);

        self.watch(notify);
        Ok(())
    }

    fn watch<F>(&self, notify: F)
    where
        F: Fn() + Send + 'static,
    {
        let slot = Arc::clone(&self.slot);
        let interval = self.poll_interval;

        let spawned = thread::Builder::new()
            .name("cfst-watch".to_string())
            .spawn(move || {
                while reap(&slot) {
                    thread::sleep(interval);
                }
                notify();
            });
        if let Err(e) = spawned {
            log::warn!("no watcher thread ({e}), relying on UI polling");
        }
    }

    /// Return the completion of the current process once it has exited.
    /// Each completion is returned exactly once; the slot is free afterwards.
    pub fn poll(&self) -> Option<Completion> {
        reap(&self.slot);
        let mut slot = lock(&self.slot);
        match std::mem::replace(&mut *slot, Current::Idle) {
            Current::Exited(done) => Some(done),
            other => {
                *slot = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<OsString> {
        vec!["-c".into(), script.into()]
    }

    fn wait_for(launcher: &Launcher) -> Completion {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(done) = launcher.poll() {
                return done;
            }
            assert!(Instant::now() < deadline, "process never finished");
            thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn preflight_lists_every_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            work_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let err = preflight(Job::Scan { threads: 1 }, &config).unwrap_err();
        match err {
            LaunchError::MissingFiles(names) => {
                assert_eq!(names, [config.executable.clone(), "ip.txt".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }

        std::fs::write(dir.path().join(&config.executable), "").unwrap();
        std::fs::write(dir.path().join("ip.txt"), "1.1.1.1\n").unwrap();
        assert!(preflight(Job::Scan { threads: 1 }, &config).is_ok());
        assert!(matches!(
            preflight(Job::SpeedTest, &config),
            Err(LaunchError::MissingFiles(names)) if names == ["region_ok.txt"]
        ));
    }

    #[test]
    fn missing_program_is_not_found() {
        let launcher = Launcher::new(Duration::from_millis(10));
        let err = launcher
            .spawn(
                Job::SpeedTest,
                Path::new("/definitely/not/a/program"),
                &[],
                Path::new("."),
                || {},
            )
            .unwrap_err();
        assert!(matches!(err, LaunchError::NotFound(_)));
        assert!(!launcher.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn completion_is_reported_once() {
        let launcher = Launcher::new(Duration::from_millis(10));
        launcher
            .spawn(
                Job::SpeedTest,
                Path::new("sh"),
                &sh("exit 3"),
                Path::new("."),
                || {},
            )
            .unwrap();

        let done = wait_for(&launcher);
        assert_eq!(done.job, Job::SpeedTest);
        assert_eq!(done.status.and_then(|s| s.code()), Some(3));
        assert!(!done.succeeded());

        thread::sleep(Duration::from_millis(50));
        assert!(launcher.poll().is_none());
        assert!(!launcher.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn second_start_while_running_is_refused() {
        let launcher = Launcher::new(Duration::from_millis(10));
        let sleep = sh("sleep 0.3");
        launcher
            .spawn(Job::Scan { threads: 1 }, Path::new("sh"), &sleep, Path::new("."), || {})
            .unwrap();
        assert_eq!(launcher.current_job(), Some(Job::Scan { threads: 1 }));

        let err = launcher
            .spawn(Job::SpeedTest, Path::new("sh"), &sleep, Path::new("."), || {})
            .unwrap_err();
        assert!(matches!(err, LaunchError::Busy(Job::Scan { .. })));

        let done = wait_for(&launcher);
        assert!(done.succeeded());
        assert!(!launcher.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn watcher_notifies_on_exit() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let launcher = Launcher::new(Duration::from_millis(5));
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        launcher
            .spawn(
                Job::SpeedTest,
                Path::new("sh"),
                &sh("exit 0"),
                Path::new("."),
                move || flag.store(true, Ordering::SeqCst),
            )
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        while !fired.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "watcher never fired");
            thread::sleep(Duration::from_millis(10));
        }
        // exited but not yet collected: the slot stays taken
        assert_eq!(launcher.current_job(), Some(Job::SpeedTest));
        let err = launcher
            .spawn(Job::Scan { threads: 1 }, Path::new("sh"), &sh("exit 0"), Path::new("."), || {})
            .unwrap_err();
        assert!(matches!(err, LaunchError::Busy(Job::SpeedTest)));

        let done = launcher.poll().expect("completion recorded by the watcher");
        assert!(done.succeeded());
        assert!(launcher.poll().is_none());
        assert!(!launcher.is_running());
    }
}
