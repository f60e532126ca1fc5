use pmopt::{OptionError, ProgramKind};
use strum::EnumIs;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, EnumIs)]
pub enum PmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },

    /// A program binary cannot be found or is not executable.
    #[error("{program} binary `{binary}` not found, looking in {searched}")]
    ProgramNotFound {
        program: ProgramKind,
        binary: String,
        searched: String,
    },

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("Extraction with `{binary}` failed: {reason}")]
    Extraction { binary: String, reason: String },

    #[error("Process error: {0}")]
    Process(String),

    #[error("Job {0} has already been started")]
    JobAlreadyStarted(Uuid),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

pub type PmResult<T> = Result<T, PmError>;
