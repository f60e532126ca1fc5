//! Starting jobs from a configured context.
use crossbeam::channel::{self, Receiver, Sender};
use log::debug;
use pmopt::{ProgramKind, directive::Directive, value::OptionValue};

use crate::{
    base::meta::SessionConfig,
    job::{Job, JobEvent},
    locator::{BinaryLocator, DirLocator},
    utils::error::PmResult,
};

/// Owns the job event channel and starts jobs with the configured locator.
pub struct Launcher {
    config: SessionConfig,
    locator: Box<dyn BinaryLocator>,
    events: Sender<JobEvent>,
    receiver: Receiver<JobEvent>,
}

impl Launcher {
    pub fn new(config: SessionConfig) -> Self {
        let locator: DirLocator = config.locator();
        Self::with_locator(config, Box::new(locator))
    }

    pub fn with_locator(config: SessionConfig, locator: Box<dyn BinaryLocator>) -> Self {
        let (events, receiver) = channel::unbounded();
        Self {
            config,
            locator,
            events,
            receiver,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn locator(&self) -> &dyn BinaryLocator {
        self.locator.as_ref()
    }

    /// Input actually given to the program: `input` preceded by the
    /// statistics request, if enabled.
    pub fn prepare_input(&self, input: &str) -> String {
        if self.config.report_stderr < 0 {
            return input.to_string();
        }
        let directive = Directive::new("report_stderr", OptionValue::Int(self.config.report_stderr));
        format!("{}\n{}", directive, input)
    }

    /// Create and start a job. A job that cannot start is returned as an error,
    /// its [`JobEvent`] is still posted.
    pub fn start(&self, program: ProgramKind, input: &str) -> PmResult<Job> {
        let mut job = Job::new(program, self.prepare_input(input));
        debug!("Starting {} job {}.", program, job.id());
        job.start(
            self.locator.as_ref(),
            self.events.clone(),
            self.config.poll_interval(),
        )?;
        Ok(job)
    }

    /// Completion events of every job started by this launcher.
    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.receiver
    }
}
