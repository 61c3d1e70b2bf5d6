/// Launching the external speed-test tool and watching it finish.

pub mod job;
pub mod launcher;

pub use job::Job;
pub use launcher::{Completion, LaunchError, Launcher};
