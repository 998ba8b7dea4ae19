use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::process::log_buffer::LogBuffer;
use crate::process::output;
use crate::service::ServiceConfig;
use crate::status::{Status, StopOutcome};

/// Time a child gets between SIGTERM and SIGKILL.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const KILL_REAP_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ProcessHandle {
    config: ServiceConfig,
    child: Option<Child>,
    exit: Option<Status>,
    logs: LogBuffer,
    reader: Option<JoinHandle<()>>,
}

impl ProcessHandle {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            child: None,
            exit: None,
            logs: LogBuffer::new(),
            reader: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    /// Spawns the child in its own process group with stdout and stderr
    /// merged, then hands the read end of the pipe to a reader thread.
    pub fn start(&mut self) -> Result<()> {
        if self.child.is_some() {
            return Ok(());
        }

        let (program, args) = self
            .config
            .command
            .split_first()
            .ok_or_else(|| Error::EmptyCommand {
                service: self.config.name.clone(),
            })?;

        info!(
            service = %self.config.name,
            dir = %self.config.working_directory.display(),
            "starting: {}",
            self.config.command.join(" ")
        );

        let pipe = output::merged_pipe().map_err(|source| self.spawn_error(source))?;
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&self.config.working_directory)
            .stdin(Stdio::null())
            .stdout(pipe.stdout)
            .stderr(pipe.stderr)
            .process_group(0);

        let spawned = cmd.spawn();
        // The Command still holds our copies of the write end; the reader
        // only sees EOF once they are gone.
        drop(cmd);

        let child = spawned.map_err(|source| self.spawn_error(source))?;
        debug!(service = %self.config.name, pid = child.id(), "spawned");
        self.child = Some(child);

        match output::spawn_reader(&self.config.name, pipe.reader, self.logs.clone()) {
            Ok(reader) => {
                self.reader = Some(reader);
                Ok(())
            }
            Err(source) => {
                self.kill_now();
                Err(self.spawn_error(source))
            }
        }
    }

    fn spawn_error(&self, source: io::Error) -> Error {
        Error::Spawn {
            service: self.config.name.clone(),
            command: self.config.command_line.clone(),
            directory: self.config.working_directory.clone(),
            source,
        }
    }

    /// Non-blocking liveness check. The first observed exit is cached, so
    /// the child is reaped exactly once.
    pub fn status(&mut self) -> Status {
        if let Some(exit) = self.exit {
            return exit;
        }
        let Some(child) = self.child.as_mut() else {
            return Status::NotStarted;
        };

        match child.try_wait() {
            Ok(None) => Status::Running,
            Ok(Some(exit)) => {
                let status = Status::from_exit(exit);
                debug!(service = %self.config.name, %status, "exited");
                self.exit = Some(status);
                status
            }
            Err(e) => {
                debug!(service = %self.config.name, error = %e, "could not poll process");
                let status = Status::Exited(-1);
                self.exit = Some(status);
                status
            }
        }
    }

    pub async fn stop(&mut self) -> StopOutcome {
        self.stop_with_grace(GRACE_PERIOD).await
    }

    /// SIGTERM to the process group, then SIGKILL once `grace` runs out.
    /// Calling this on a process that already exited does nothing.
    pub async fn stop_with_grace(&mut self, grace: Duration) -> StopOutcome {
        if !self.status().is_running() {
            return StopOutcome::AlreadyExited;
        }
        let Some(pid) = self.child.as_ref().map(|child| child.id()) else {
            return StopOutcome::AlreadyExited;
        };

        info!(service = %self.config.name, "stopping");
        self.send(pid, Signal::SIGTERM);

        if self.wait_for_exit(grace).await {
            self.release_reader();
            return StopOutcome::Terminated;
        }

        warn!(
            service = %self.config.name,
            "still running after {}s, killing",
            grace.as_secs_f32()
        );
        self.send(pid, Signal::SIGKILL);
        if !self.wait_for_exit(KILL_REAP_TIMEOUT).await {
            warn!(service = %self.config.name, "process did not die after SIGKILL");
        }
        self.release_reader();
        StopOutcome::Killed
    }

    fn send(&self, pid: u32, sig: Signal) {
        let pid = Pid::from_raw(pid as i32);
        if let Err(errno) = signal::killpg(pid, sig) {
            debug!(service = %self.config.name, %errno, "killpg failed, signalling leader only");
            let _ = signal::kill(pid, sig);
        }
    }

    async fn wait_for_exit(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.status().is_running() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    // Best effort: a grandchild may still hold the pipe open, in which case
    // the thread is left behind and the OS reclaims it at exit.
    fn release_reader(&mut self) {
        if let Some(reader) = self.reader.take() {
            if reader.is_finished() {
                let _ = reader.join();
            } else {
                debug!(service = %self.config.name, "output reader still draining, detaching");
            }
        }
    }

    /// SIGKILL to the whole group without a grace period, then reap.
    fn kill_now(&mut self) {
        if !self.status().is_running() {
            return;
        }
        if let Some(pid) = self.child.as_ref().map(|child| child.id()) {
            self.send(pid, Signal::SIGKILL);
        }
        if let Some(child) = self.child.as_mut()
            && let Ok(exit) = child.wait()
        {
            self.exit = Some(Status::from_exit(exit));
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.kill_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config(command: &str) -> ServiceConfig {
        ServiceConfig::parse("backend", command, Path::new("."), true).unwrap()
    }

    async fn wait_until_exited(handle: &mut ProcessHandle) -> Status {
        for _ in 0..100 {
            let status = handle.status();
            if !status.is_running() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.status()
    }

    async fn wait_for_lines(logs: &LogBuffer, count: usize) {
        for _ in 0..100 {
            if logs.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[test]
    fn unstarted_handle_reports_not_started() {
        let mut handle = ProcessHandle::new(config("sleep 1"));
        assert_eq!(handle.status(), Status::NotStarted);
        assert!(handle.logs().is_empty());
    }

    #[tokio::test]
    async fn captures_output_of_a_short_command() {
        let mut handle = ProcessHandle::new(config("printf hello"));
        handle.start().unwrap();

        assert_eq!(wait_until_exited(&mut handle).await, Status::Exited(0));
        wait_for_lines(handle.logs(), 1).await;
        assert_eq!(handle.logs().snapshot(), vec!["hello"]);
    }

    #[tokio::test]
    async fn merges_stdout_and_stderr_in_order() {
        let mut handle = ProcessHandle::new(config(
            "sh -c 'echo out-1; echo err-1 >&2; echo out-2; echo err-2 >&2'",
        ));
        handle.start().unwrap();

        wait_until_exited(&mut handle).await;
        wait_for_lines(handle.logs(), 4).await;
        assert_eq!(
            handle.logs().snapshot(),
            vec!["out-1", "err-1", "out-2", "err-2"]
        );
    }

    #[tokio::test]
    async fn reports_non_zero_exit_code() {
        let mut handle = ProcessHandle::new(config("sh -c 'exit 3'"));
        handle.start().unwrap();
        assert_eq!(wait_until_exited(&mut handle).await, Status::Exited(3));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let mut handle = ProcessHandle::new(config("definitely-not-a-real-binary-xyz"));
        let err = handle.start().unwrap_err();
        match err {
            Error::Spawn { service, command, .. } => {
                assert_eq!(service, "backend");
                assert_eq!(command, "definitely-not-a-real-binary-xyz");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(handle.status(), Status::NotStarted);
    }

    #[test]
    fn startup_io_errors_carry_the_service_context() {
        let config = ServiceConfig::parse("frontend", "npm run dev", Path::new("/srv/web"), true)
            .unwrap();
        let handle = ProcessHandle::new(config);
        let err = handle.spawn_error(io::Error::from(io::ErrorKind::OutOfMemory));
        match err {
            Error::Spawn {
                service,
                command,
                directory,
                source,
            } => {
                assert_eq!(service, "frontend");
                assert_eq!(command, "npm run dev");
                assert_eq!(directory, Path::new("/srv/web"));
                assert_eq!(source.kind(), io::ErrorKind::OutOfMemory);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn kill_now_takes_the_whole_group_down() {
        // The backgrounded sleep inherits the output pipe, so the reader
        // only finishes once the grandchild is gone too.
        let mut handle = ProcessHandle::new(config("sh -c 'sleep 60 & wait'"));
        handle.start().unwrap();
        assert_eq!(handle.status(), Status::Running);
        tokio::time::sleep(Duration::from_millis(100)).await;

        handle.kill_now();
        assert_eq!(handle.status(), Status::Exited(137));

        let reader = handle.reader.take().unwrap();
        for _ in 0..100 {
            if reader.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(reader.is_finished());
    }

    #[tokio::test]
    async fn missing_working_directory_is_a_spawn_error() {
        let config =
            ServiceConfig::parse("frontend", "true", Path::new("/definitely/not/here"), true).unwrap();
        let mut handle = ProcessHandle::new(config);
        assert!(matches!(handle.start(), Err(Error::Spawn { .. })));
    }

    #[tokio::test]
    async fn runs_in_the_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::parse("backend", "pwd", dir.path(), true).unwrap();
        let mut handle = ProcessHandle::new(config);
        handle.start().unwrap();

        wait_until_exited(&mut handle).await;
        wait_for_lines(handle.logs(), 1).await;
        let expected = dir.path().canonicalize().unwrap();
        let printed = handle.logs().snapshot();
        assert_eq!(
            Path::new(&printed[0]).canonicalize().unwrap(),
            expected
        );
    }

    #[tokio::test]
    async fn stop_terminates_within_grace_period() {
        let mut handle = ProcessHandle::new(config("sleep 60"));
        handle.start().unwrap();
        assert_eq!(handle.status(), Status::Running);

        let outcome = handle.stop().await;
        assert_eq!(outcome, StopOutcome::Terminated);
        assert_eq!(handle.status(), Status::Exited(143));
    }

    #[tokio::test]
    async fn stop_twice_is_a_no_op() {
        let mut handle = ProcessHandle::new(config("sleep 60"));
        handle.start().unwrap();

        assert_eq!(handle.stop().await, StopOutcome::Terminated);
        assert_eq!(handle.stop().await, StopOutcome::AlreadyExited);
    }

    #[tokio::test]
    async fn stop_on_exited_process_is_a_no_op() {
        let mut handle = ProcessHandle::new(config("true"));
        handle.start().unwrap();
        wait_until_exited(&mut handle).await;

        assert_eq!(handle.stop().await, StopOutcome::AlreadyExited);
    }

    #[tokio::test]
    async fn escalates_to_kill_when_term_is_ignored() {
        let mut handle = ProcessHandle::new(config(
            "sh -c 'trap \"\" TERM; echo ready; while true; do sleep 1; done'",
        ));
        handle.start().unwrap();
        wait_for_lines(handle.logs(), 1).await;

        let outcome = handle.stop_with_grace(Duration::from_millis(300)).await;
        assert_eq!(outcome, StopOutcome::Killed);
        assert_eq!(handle.status(), Status::Exited(137));
    }
}
