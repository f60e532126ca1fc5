/// Name of the environment variable containing the path to the session configuration file.
/// If not set, defaults to
///  (1) on Linux and macOS: `$XDG_CONFIG_HOME/prover9-mace4/session.toml` or `$HOME/.config/prover9-mace4/session.toml`
///  (2) on Windows: `%APPDATA%\prover9-mace4\session.toml`
pub const ENV_CONFIG_PATH: &str = "PM_CONFIG_PATH";

pub const CONFIG_DIR_NAME: &str = "prover9-mace4";
pub const CONFIG_FILE_NAME: &str = "session.toml";

/// Default period between two checks of a running child, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default statistics period requested from the programs, in seconds.
pub const DEFAULT_REPORT_STDERR: i64 = 2;

/// Exit code of the extraction programs when the output holds no solution.
pub const EXTRACTION_NO_SOLUTION: i32 = 2;

/// Name prefix of the threads monitoring child processes.
pub const MONITOR_THREAD_PREFIX: &str = "pm-job";
