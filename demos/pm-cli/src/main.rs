use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use crossbeam::channel::RecvTimeoutError;
use log::debug;
use pmcore::{
    base::meta::SessionConfig,
    extractor::{Extraction, ResultExtractor},
    input::{InputAssembler, StandardInput},
    isofilter::{IsofilterOptions, isofilter},
    job::Job,
    launcher::Launcher,
    syntax::{SyntaxCheck, syntax_check},
    utils::error::{PmError, PmResult},
};
use pmlog::{LogLevel, LogSink};
use pmopt::{
    OptionError, ProgramKind,
    directive::render_directives,
    record::LabelState,
    registry::OptionEntry,
    session::OptionSession,
};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Front-end for the Prover9 and Mace4 option sessions and jobs
#[derive(Parser)]
#[command(name = "pm-cli", version, about, long_about = None)]
pub struct Arguments {
    /// Session configuration file (defaults to the user configuration)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise the log level, may be repeated
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct Settings {
    /// Change an option through the dependency rules, `[PROGRAM.]NAME=VALUE`
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
}

#[derive(Args)]
pub struct Problem {
    #[command(flatten)]
    pub settings: Settings,

    /// File holding the assumptions
    #[arg(long)]
    pub assumptions: PathBuf,

    /// File holding the goals
    #[arg(long)]
    pub goals: PathBuf,

    /// File holding `op`/`redeclare` commands
    #[arg(long)]
    pub language: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the options of a program
    Options {
        program: ProgramKind,

        #[command(flatten)]
        settings: Settings,

        /// Print every option with its label state instead of the nondefault directives
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Print the assembled input
    Input {
        #[command(flatten)]
        problem: Problem,
    },
    /// Run a search and print its result
    Run {
        program: ProgramKind,

        #[command(flatten)]
        problem: Problem,

        /// Directory holding the program binaries, may be repeated
        #[arg(long)]
        bin_dir: Vec<PathBuf>,

        /// Reformat the solutions with the extraction program (eg. `xml`)
        #[arg(long)]
        format: Option<String>,

        /// Remove isomorphic models from a Mace4 result
        #[arg(long, default_value_t = false)]
        isofilter: bool,
    },
    /// Check the assembled input with Prover9 without searching
    Check {
        #[command(flatten)]
        problem: Problem,
    },
}

fn load_config(path: Option<&Path>) -> PmResult<SessionConfig> {
    match path {
        Some(path) => SessionConfig::load_from_toml(path),
        None => SessionConfig::load(),
    }
}

/// Apply `[PROGRAM.]NAME=VALUE` settings. Without a program prefix the setting
/// goes to `default`, or to every program knowing the option.
fn apply_settings(
    session: &mut OptionSession,
    settings: &Settings,
    default: Option<ProgramKind>,
) -> PmResult<()> {
    for item in &settings.set {
        let (target, text) = item
            .split_once('=')
            .ok_or_else(|| PmError::Unknown(format!("expected NAME=VALUE, got `{}`", item)))?;

        let (programs, name) = match target.split_once('.') {
            Some((program, name)) => {
                let program: ProgramKind = program
                    .parse()
                    .map_err(|_| PmError::Unknown(format!("unknown program `{}`", program)))?;
                (vec![program], name)
            }
            None => match default {
                Some(program) => (vec![program], target),
                None => (vec![ProgramKind::Prover9, ProgramKind::Mace4], target),
            },
        };

        let mut applied = false;
        for program in programs.iter().copied() {
            let Some(kind) = session.kind_of(program, name).cloned() else {
                continue;
            };
            let value = kind.parse_value(text).ok_or_else(|| {
                PmError::Unknown(format!("`{}` is not a valid {} for {}", text, kind.name(), name))
            })?;
            let report = session.apply_change_by_name(program, name, value)?;
            debug!("{} records changed by {}.", report.changed.len(), item);
            applied = true;
        }

        if !applied {
            return Err(OptionError::UnknownOption {
                program: programs[0],
                name: name.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn read_problem(problem: &Problem) -> PmResult<StandardInput> {
    let language = match &problem.language {
        Some(path) => std::fs::read_to_string(path)?,
        None => String::new(),
    };
    Ok(StandardInput {
        language,
        assumptions: std::fs::read_to_string(&problem.assumptions)?,
        goals: std::fs::read_to_string(&problem.goals)?,
        ..StandardInput::default()
    })
}

fn print_all(out: &mut impl WriteColor, session: &OptionSession, program: ProgramKind) -> PmResult<()> {
    for set in session.registry(program).sets() {
        out.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(out, "== {} ==", set.name())?;
        out.reset()?;

        for entry in set.entries() {
            match entry {
                OptionEntry::GroupMarker { title, .. } => writeln!(out, "  -- {} --", title)?,
                OptionEntry::Record(key) => {
                    let record = session.record(*key);
                    let state = session.label_state(*key);
                    let color = match state {
                        LabelState::Default => None,
                        LabelState::DefaultWithDependents => Some(Color::Blue),
                        LabelState::Nondefault => Some(Color::Red),
                    };
                    out.set_color(ColorSpec::new().set_fg(color))?;
                    write!(out, "  {} = {}", record.name(), session.value(*key))?;
                    out.reset()?;
                    writeln!(out, "  [{}; {}]", record.kind().name(), state)?;
                }
            }
        }
    }
    Ok(())
}

fn progress_line(job: &Job) -> Option<String> {
    let info = job.progress_info()?;
    let fields: Vec<String> = info
        .fields()
        .into_iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect();
    Some(format!("[{}] {}", job.state(), fields.join(", ")))
}

fn print_result(
    out: &mut impl WriteColor,
    job: &Job,
    launcher: &Launcher,
    format: Option<&str>,
    filter: bool,
) -> PmResult<()> {
    let spec = job.spec();
    let solved = job.outcome().is_some_and(|outcome| outcome.is_solution());
    out.set_color(ColorSpec::new().set_fg(Some(if solved { Color::Green } else { Color::Yellow })).set_bold(true))?;
    writeln!(
        out,
        "{}: {}",
        spec.name,
        job.exit_label().unwrap_or_else(|| job.state().to_string())
    )?;
    out.reset()?;

    if let Some(line) = progress_line(job) {
        writeln!(out, "{}", line)?;
    }
    if let Some(message) = job.partial_success() {
        writeln!(out, "{}", message)?;
    }

    match job.extraction() {
        Some(Extraction::Found(payload)) => {
            writeln!(out, "{} {}(s) found.", job.solution_count(), spec.solution_name)?;
            let text = match format {
                Some(format) => {
                    let binary = launcher
                        .locator()
                        .locate(spec.extraction_binary)
                        .ok_or_else(|| PmError::ProgramNotFound {
                            program: spec.program,
                            binary: spec.extraction_binary.to_string(),
                            searched: launcher.locator().describe(),
                        })?;
                    ResultExtractor::new(binary, spec).reformat(&payload, &[format])?
                }
                None => payload,
            };
            if filter {
                let result = isofilter(
                    launcher.locator(),
                    &text,
                    &IsofilterOptions::for_models(&text),
                )?;
                writeln!(out, "{}", result.models)?;
                writeln!(out, "{}", result.summary())?;
            } else {
                writeln!(out, "{}", text)?;
            }
        }
        Some(Extraction::NoSolution) => writeln!(out, "No {} in the output.", spec.solution_name)?,
        Some(Extraction::Failed(message)) => writeln!(out, "{}", message)?,
        None => {}
    }
    Ok(())
}

fn run(args: Arguments) -> PmResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    let stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut out = stdout.lock();

    match args.command {
        Command::Options {
            program,
            settings,
            all,
        } => {
            let mut session = config.session()?;
            apply_settings(&mut session, &settings, Some(program))?;
            if all {
                print_all(&mut out, &session, program)?;
            } else {
                write!(out, "{}", render_directives(&session.nondefaults(program)))?;
            }
        }
        Command::Input { problem } => {
            let mut session = config.session()?;
            apply_settings(&mut session, &problem.settings, None)?;
            write!(out, "{}", read_problem(&problem)?.assemble(&session))?;
        }
        Command::Run {
            program,
            problem,
            bin_dir,
            format,
            isofilter,
        } => {
            if isofilter && program != ProgramKind::Mace4 {
                return Err(PmError::Unknown("--isofilter only applies to mace4".to_string()));
            }
            if let Some(format) = &format {
                let formats = pmcore::program::ProgramSpec::of(program).formats;
                if !formats.contains(&format.as_str()) {
                    return Err(PmError::Unknown(format!(
                        "unknown {} format `{}`, expected one of {}",
                        program,
                        format,
                        formats.join(", ")
                    )));
                }
            }
            if !bin_dir.is_empty() {
                config.bin_dirs = bin_dir;
            }

            let mut session = config.session()?;
            apply_settings(&mut session, &problem.settings, Some(program))?;
            let input = read_problem(&problem)?.assemble(&session);

            let launcher = Launcher::new(config);
            let job = launcher.start(program, &input)?;
            loop {
                match launcher.events().recv_timeout(Duration::from_secs(1)) {
                    Ok(_) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some(line) = progress_line(&job) {
                            writeln!(out, "{}", line)?;
                            out.flush()?;
                        }
                    }
                }
            }

            print_result(&mut out, &job, &launcher, format.as_deref(), isofilter)?;
            job.finalize();
        }
        Command::Check { problem } => {
            let mut session = config.session()?;
            apply_settings(&mut session, &problem.settings, None)?;
            let input = read_problem(&problem)?.assemble(&session);
            match syntax_check(&config.locator(), &input)? {
                SyntaxCheck::Okay => writeln!(out, "Okay")?,
                SyntaxCheck::InputError { message, error } => {
                    writeln!(out, "Input error: {}", message)?;
                    if let Some(error) = error {
                        writeln!(out, "{}", error)?;
                    }
                }
                SyntaxCheck::OtherError(output) => writeln!(out, "Error:\n{}", output)?,
                SyntaxCheck::Aborted { label, .. } => writeln!(out, "Check {}", label)?,
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn main() {
    let args = Arguments::parse();

    if let Err(error) = pmlog::init(LogLevel::from_verbosity(args.verbose), LogSink::default()) {
        eprintln!("Cannot install logger: {}", error);
    }

    if let Err(error) = run(args) {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}
