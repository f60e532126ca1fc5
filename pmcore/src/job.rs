//! Lifecycle of one external search.
//!
//! A [`Job`] owns a child process, the temporary files backing its standard
//! streams, and a background thread monitoring it:
//!
//! ```text
//! Ready --start--> Running --pause--> Suspended
//!   |                 ^   <--resume--    |
//!   |                 |                  |
//!   |             exit/kill <------------+
//!   |                 v
//!   +--missing--> Error      Done
//! ```
//!
//! The child handle, the state and the captured results live behind a single
//! lock. The monitor only reaps the child while holding it, and signals are
//! only sent while holding it, so a signal never reaches a recycled pid.
//!
//! Completion is announced with a [`JobEvent`] on a `crossbeam` channel; the
//! controlling context is never blocked by a running search.
use std::{
    fmt, fs,
    io::Write,
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    sync::Arc,
    thread::JoinHandle,
    time::Duration,
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};
use parking_lot::Mutex;
use pmopt::ProgramKind;
use strum::{Display, EnumIs};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::{
    extractor::{Extraction, ResultExtractor},
    locator::BinaryLocator,
    magic::MONITOR_THREAD_PREFIX,
    program::{ExitOutcome, ProgramSpec},
    stats::ProgressInfo,
    utils::error::{PmError, PmResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum JobState {
    Ready,
    Running,
    /// Stopped with `SIGSTOP`, waiting to be resumed.
    Suspended,
    Done,
    /// The program could not be started.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// The job reached [`JobState::Done`] or [`JobState::Error`].
    Finished {
        id: Uuid,
        program: ProgramKind,
        state: JobState,
        exit_code: Option<i32>,
    },
}

struct JobFiles {
    _stdin: NamedTempFile,
    stdout: NamedTempFile,
    stderr: NamedTempFile,
}

struct Inner {
    state: JobState,
    child: Option<Child>,
    exit_code: Option<i32>,
    output: Option<String>,
    error_log: Option<String>,
    extraction: Option<Extraction>,
    files: Option<JobFiles>,
}

struct Shared {
    id: Uuid,
    program: ProgramKind,
    inner: Mutex<Inner>,
}

pub struct Job {
    shared: Arc<Shared>,
    input: String,
    wake: Option<Sender<()>>,
    monitor: Option<JoinHandle<()>>,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.shared.id)
            .field("program", &self.shared.program)
            .field("state", &self.state())
            .finish()
    }
}

/// Exit code of a finished child; termination by signal `s` yields `-s`.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

#[cfg(unix)]
fn send_signal(child: &Child, signal: libc::c_int) -> bool {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        return false;
    };
    // SAFETY: `pid` is our own unreaped child, the caller holds the job lock.
    unsafe { libc::kill(pid, signal) == 0 }
}

impl Job {
    pub fn new(program: ProgramKind, input: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                program,
                inner: Mutex::new(Inner {
                    state: JobState::Ready,
                    child: None,
                    exit_code: None,
                    output: None,
                    error_log: None,
                    extraction: None,
                    files: None,
                }),
            }),
            input: input.into(),
            wake: None,
            monitor: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn program(&self) -> ProgramKind {
        self.shared.program
    }

    pub fn spec(&self) -> &'static ProgramSpec {
        ProgramSpec::of(self.shared.program)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    fn fail_to_start(&self, events: &Sender<JobEvent>, error: PmError) -> PmResult<()> {
        self.shared.inner.lock().state = JobState::Error;
        warn!("{} job {} cannot start: {}", self.shared.program, self.shared.id, error);
        let _ = events.send(JobEvent::Finished {
            id: self.shared.id,
            program: self.shared.program,
            state: JobState::Error,
            exit_code: None,
        });
        Err(error)
    }

    /// Start the search in the background.
    ///
    /// Fails with [`PmError::ProgramNotFound`] (and moves to
    /// [`JobState::Error`], posting a [`JobEvent`]) when the search or the
    /// extraction program cannot be located.
    pub fn start(
        &mut self,
        locator: &dyn BinaryLocator,
        events: Sender<JobEvent>,
        poll_interval: Duration,
    ) -> PmResult<()> {
        if !self.shared.inner.lock().state.is_ready() {
            return Err(PmError::JobAlreadyStarted(self.shared.id));
        }

        let spec = self.spec();
        let resolve = |name: &str| {
            locator
                .locate(name)
                .ok_or_else(|| PmError::ProgramNotFound {
                    program: spec.program,
                    binary: name.to_string(),
                    searched: locator.describe(),
                })
        };
        let binaries = resolve(spec.search_binary)
            .and_then(|search| Ok((search, resolve(spec.extraction_binary)?)));
        let (search, extraction) = match binaries {
            Ok(binaries) => binaries,
            Err(error) => return self.fail_to_start(&events, error),
        };
        let extractor = ResultExtractor::new(extraction, spec);

        if let Err(error) = self.spawn(&search, spec) {
            return self.fail_to_start(&events, error);
        }

        let (wake_tx, wake_rx) = channel::unbounded();
        let shared = Arc::clone(&self.shared);
        let monitor_events = events.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("{}-{}", MONITOR_THREAD_PREFIX, self.shared.id))
            .spawn(move || monitor(shared, wake_rx, monitor_events, extractor, poll_interval));

        match spawned {
            Ok(handle) => {
                self.wake = Some(wake_tx);
                self.monitor = Some(handle);
                Ok(())
            }
            Err(err) => self.abandon(
                &events,
                PmError::Process(format!("cannot spawn monitor thread: {}", err)),
            ),
        }
    }

    /// Kill and reap a spawned child nobody will monitor, then fail the start.
    fn abandon(&self, events: &Sender<JobEvent>, error: PmError) -> PmResult<()> {
        {
            let mut inner = self.shared.inner.lock();
            if let Some(mut child) = inner.child.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
            inner.files = None;
        }
        self.fail_to_start(events, error)
    }

    fn spawn(&self, search: &std::path::Path, spec: &ProgramSpec) -> PmResult<()> {
        let mut stdin = NamedTempFile::new()?;
        stdin.write_all(self.input.as_bytes())?;
        stdin.flush()?;
        let stdout = NamedTempFile::new()?;
        let stderr = NamedTempFile::new()?;

        let child = Command::new(search)
            .args(spec.search_args)
            .stdin(Stdio::from(stdin.reopen()?))
            .stdout(Stdio::from(stdout.reopen()?))
            .stderr(Stdio::from(stderr.reopen()?))
            .spawn()?;

        info!(
            "{} job {} started: `{}` (pid {}).",
            spec.name,
            self.shared.id,
            search.display(),
            child.id()
        );

        let mut inner = self.shared.inner.lock();
        inner.child = Some(child);
        inner.files = Some(JobFiles {
            _stdin: stdin,
            stdout,
            stderr,
        });
        inner.state = JobState::Running;
        Ok(())
    }

    /// Suspend a running search. Returns whether the job was paused.
    pub fn pause(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if !inner.state.is_running() {
            return false;
        }

        #[cfg(unix)]
        {
            let stopped = inner
                .child
                .as_ref()
                .is_some_and(|child| send_signal(child, libc::SIGSTOP));
            if stopped {
                inner.state = JobState::Suspended;
                info!("{} job {} paused.", self.shared.program, self.shared.id);
            }
            stopped
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Resume a suspended search. Returns whether the job was resumed.
    pub fn resume(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if !inner.state.is_suspended() {
            return false;
        }

        #[cfg(unix)]
        {
            let resumed = inner
                .child
                .as_ref()
                .is_some_and(|child| send_signal(child, libc::SIGCONT));
            if resumed {
                inner.state = JobState::Running;
                info!("{} job {} resumed.", self.shared.program, self.shared.id);
            }
            resumed
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Terminate a running or suspended search. Completion is still announced
    /// by the monitor. Returns whether a kill was sent.
    pub fn kill(&self) -> bool {
        let killed = {
            let mut inner = self.shared.inner.lock();
            if !matches!(inner.state, JobState::Running | JobState::Suspended) {
                return false;
            }
            match inner.child.as_mut() {
                Some(child) => child.kill().is_ok(),
                None => false,
            }
        };

        if killed {
            info!("{} job {} killed.", self.shared.program, self.shared.id);
            if let Some(wake) = &self.wake {
                let _ = wake.send(());
            }
        }
        killed
    }

    pub fn state(&self) -> JobState {
        self.shared.inner.lock().state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state(), JobState::Done | JobState::Error)
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.shared.inner.lock().exit_code
    }

    pub fn exit_label(&self) -> Option<String> {
        self.exit_code().map(|code| self.spec().exit_label(code))
    }

    pub fn outcome(&self) -> Option<ExitOutcome> {
        self.exit_code().map(|code| self.spec().outcome(code))
    }

    /// Full stdout of the finished search.
    pub fn output(&self) -> Option<String> {
        self.shared.inner.lock().output.clone()
    }

    /// Full stderr of the finished search.
    pub fn error_log(&self) -> Option<String> {
        self.shared.inner.lock().error_log.clone()
    }

    pub fn extraction(&self) -> Option<Extraction> {
        self.shared.inner.lock().extraction.clone()
    }

    /// Extracted solutions, if any were found.
    pub fn solution(&self) -> Option<String> {
        self.shared
            .inner
            .lock()
            .extraction
            .as_ref()
            .and_then(|extraction| extraction.payload().map(str::to_string))
    }

    pub fn solution_found(&self) -> bool {
        self.shared
            .inner
            .lock()
            .extraction
            .as_ref()
            .is_some_and(Extraction::is_found)
    }

    pub fn solution_count(&self) -> usize {
        self.solution()
            .map(|payload| self.spec().count_solutions(&payload))
            .unwrap_or(0)
    }

    /// Message for solutions found by a search that did not exit with success.
    pub fn partial_success(&self) -> Option<&'static str> {
        let message = self.spec().partial_message;
        let partial = self.solution_found() && self.exit_code().is_some_and(|code| code != 0);
        (partial && !message.is_empty()).then_some(message)
    }

    /// Latest statistics reported on stderr.
    ///
    /// Available while running, suspended or done. The stderr file is read
    /// through its own handle, the child's writes are not disturbed.
    pub fn progress_info(&self) -> Option<ProgressInfo> {
        let path: PathBuf = {
            let inner = self.shared.inner.lock();
            if !matches!(
                inner.state,
                JobState::Running | JobState::Suspended | JobState::Done
            ) {
                return None;
            }
            inner.files.as_ref()?.stderr.path().to_path_buf()
        };

        let bytes = fs::read(&path).ok()?;
        Some(ProgressInfo::parse(
            self.shared.program,
            &String::from_utf8_lossy(&bytes),
        ))
    }

    fn shutdown(&mut self) {
        {
            let mut inner = self.shared.inner.lock();
            if let Some(child) = inner.child.as_mut() {
                let _ = child.kill();
            }
        }
        if let Some(wake) = self.wake.take() {
            let _ = wake.send(());
        }
        if let Some(monitor) = self.monitor.take() {
            if monitor.join().is_err() {
                warn!("Monitor of job {} panicked.", self.shared.id);
            }
        }
        self.shared.inner.lock().files = None;
    }

    /// Acknowledge the job: kill a live search, wait for the monitor and
    /// release the temporary files.
    pub fn finalize(mut self) {
        self.shutdown();
        debug!("{} job {} finalized.", self.shared.program, self.shared.id);
    }
}

impl Drop for Job {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn read_lossy(path: Option<PathBuf>) -> String {
    path.and_then(|path| fs::read(path).ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn monitor(
    shared: Arc<Shared>,
    wake: Receiver<()>,
    events: Sender<JobEvent>,
    extractor: ResultExtractor,
    poll_interval: Duration,
) {
    let exit_code = loop {
        {
            let mut inner = shared.inner.lock();
            let Some(child) = inner.child.as_mut() else {
                break -1;
            };
            let status = match child.try_wait() {
                Ok(status) => status,
                Err(err) => {
                    warn!("Cannot poll job {}: {}", shared.id, err);
                    let _ = child.kill();
                    child.wait().ok()
                }
            };
            if let Some(status) = status {
                inner.child = None;
                let code = exit_code_of(status);
                inner.exit_code = Some(code);
                break code;
            }
        }

        match wake.recv_timeout(poll_interval) {
            Ok(()) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => std::thread::sleep(poll_interval),
        }
    };

    let (stdout, stderr) = {
        let inner = shared.inner.lock();
        let files = inner.files.as_ref();
        (
            files.map(|files| files.stdout.path().to_path_buf()),
            files.map(|files| files.stderr.path().to_path_buf()),
        )
    };
    let output = read_lossy(stdout);
    let error_log = read_lossy(stderr);

    let spec = ProgramSpec::of(shared.program);
    let extraction = (exit_code == 0 || spec.exists_solution(&output))
        .then(|| extractor.extract(&output));

    info!(
        "{} job {} finished: {} ({}).",
        spec.name,
        shared.id,
        spec.exit_label(exit_code),
        exit_code
    );

    {
        let mut inner = shared.inner.lock();
        inner.output = Some(output);
        inner.error_log = Some(error_log);
        inner.extraction = extraction;
        inner.state = JobState::Done;
    }

    let _ = events.send(JobEvent::Finished {
        id: shared.id,
        program: shared.program,
        state: JobState::Done,
        exit_code: Some(exit_code),
    });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_abandoned_start_posts_error() {
        let job = Job::new(ProgramKind::Prover9, "");
        {
            let mut inner = job.shared.inner.lock();
            inner.child = Some(Command::new("sleep").arg("30").spawn().unwrap());
            inner.state = JobState::Running;
        }

        let (tx, rx) = channel::unbounded();
        let err = job
            .abandon(&tx, PmError::Process("no monitor".to_string()))
            .unwrap_err();
        assert!(matches!(err, PmError::Process(_)));

        assert_eq!(job.state(), JobState::Error);
        assert!(job.shared.inner.lock().child.is_none());
        assert_eq!(
            rx.try_recv().unwrap(),
            JobEvent::Finished {
                id: job.id(),
                program: ProgramKind::Prover9,
                state: JobState::Error,
                exit_code: None,
            }
        );
        assert!(!job.kill());
    }

    #[test]
    fn test_debug_shows_state() {
        let job = Job::new(ProgramKind::Mace4, "");
        let text = format!("{:?}", job);
        assert!(text.starts_with("Job {"));
        assert!(text.contains("Mace4"));
        assert!(text.contains("state: Ready"));
    }
}
