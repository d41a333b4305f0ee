//! Shell command execution
//!
//! Execute targets are fire-and-forget: the event loop never waits on a
//! command and never sees its exit status.

use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Runs the command strings of `exec` targets
pub trait CommandRunner {
    fn run_detached(&mut self, command: &str);
}

/// Runs commands through `/bin/sh -c` with all stdio closed
#[derive(Clone, Copy, Debug, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        ShellRunner
    }
}

impl CommandRunner for ShellRunner {
    fn run_detached(&mut self, command: &str) {
        let spawned = Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                debug!(command, pid = child.id(), "spawned command");
                // Reap on a side thread so finished commands don't linger as zombies
                thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => debug!(command, error = %e, "failed to spawn command"),
        }
    }
}

/// Collects commands instead of running them
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingRunner {
    commands: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far, oldest first
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Returns and clears the recorded commands
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.commands)
    }
}

impl CommandRunner for RecordingRunner {
    fn run_detached(&mut self, command: &str) {
        self.commands.push(command.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_runner_keeps_order() {
        let mut runner = RecordingRunner::new();
        runner.run_detached("first");
        runner.run_detached("second");

        assert_eq!(runner.commands(), ["first", "second"]);
        assert_eq!(runner.take(), vec!["first", "second"]);
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_shell_runner_does_not_block() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("ran");

        let mut runner = ShellRunner::new();
        runner.run_detached(&format!("touch '{}'", marker.display()));

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(3);
        while !marker.exists() && std::time::Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(marker.exists());
    }
}
