use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use pmopt::{ProgramKind, session::OptionSession, value::OptionValue};
use serde::{Deserialize, Serialize};

use crate::{
    locator::DirLocator,
    magic::{
        CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REPORT_STDERR,
        ENV_CONFIG_PATH,
    },
    utils::error::{PmError, PmResult},
};

/// Option values applied to a fresh session, per program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presets {
    pub prover9: BTreeMap<String, OptionValue>,
    pub mace4: BTreeMap<String, OptionValue>,
}

impl Presets {
    pub fn for_program(&self, program: ProgramKind) -> &BTreeMap<String, OptionValue> {
        match program {
            ProgramKind::Prover9 => &self.prover9,
            ProgramKind::Mace4 => &self.mace4,
        }
    }
}

/// Session configuration, stored as TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directories searched for the program binaries. Empty means `$PATH`.
    pub bin_dirs: Vec<PathBuf>,
    /// Period between two checks of a running child, in milliseconds.
    pub poll_interval_ms: u64,
    /// Statistics period requested from the programs on stderr, negative to disable.
    pub report_stderr: i64,
    pub presets: Presets,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bin_dirs: Vec::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            report_stderr: DEFAULT_REPORT_STDERR,
            presets: Presets::default(),
        }
    }
}

impl SessionConfig {
    /// Get the default path to the session configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();

        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                path.push(appdata);
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                path.push(xdg_config_home);
            } else if let Ok(home) = std::env::var("HOME") {
                path.push(home);
                path.push(".config");
            }
        }

        path.push(CONFIG_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        path
    }

    /// Load the configuration at [`Self::default_path`], or the default
    /// configuration if that file does not exist.
    pub fn load() -> PmResult<Self> {
        let path = Self::default_path();
        if !path.exists() {
            debug!("No configuration at `{}`, using defaults.", path.display());
            return Ok(Self::default());
        }
        Self::load_from_toml(&path)
    }

    pub fn from_toml_str(toml_str: &str, file: &str) -> PmResult<Self> {
        toml::from_str(toml_str).map_err(|source| PmError::ConfigParse {
            source,
            file: file.to_string(),
        })
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> PmResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str, &path.display().to_string())
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save_to_toml(&self, path: &Path) -> PmResult<()> {
        let toml_str = toml::to_string(self).map_err(|e| {
            PmError::Unknown(format!(
                "Failed during serialization of TOML to path `{}`: {}",
                path.display(),
                e
            ))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Locator over [`Self::bin_dirs`], or `$PATH` when none is configured.
    pub fn locator(&self) -> DirLocator {
        DirLocator::new(self.bin_dirs.iter().cloned())
    }

    /// Apply the presets through the dependency engine, prover first.
    pub fn apply_presets(&self, session: &mut OptionSession) -> PmResult<()> {
        for program in [ProgramKind::Prover9, ProgramKind::Mace4] {
            for (name, value) in self.presets.for_program(program) {
                let report = session.apply_change_by_name(program, name, value.clone())?;
                debug!(
                    "Preset {}.{} = {} ({} records updated).",
                    program,
                    name,
                    value,
                    report.changed.len()
                );
            }
        }
        Ok(())
    }

    /// Fresh standard session with the presets applied.
    pub fn session(&self) -> PmResult<OptionSession> {
        let mut session = OptionSession::standard()?;
        self.apply_presets(&mut session)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            bin_dirs = ["/opt/ladr/bin"]

            [presets.prover9]
            max_weight = 40
            order = "kbo"
            auto2 = true
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(config.bin_dirs, [PathBuf::from("/opt/ladr/bin")]);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.report_stderr, DEFAULT_REPORT_STDERR);
        assert_eq!(config.presets.prover9["max_weight"], OptionValue::Int(40));
        assert_eq!(config.presets.prover9["order"], OptionValue::from("kbo"));
        assert_eq!(config.presets.prover9["auto2"], OptionValue::Flag(true));
        assert!(config.presets.mace4.is_empty());
    }

    #[test]
    fn test_presets_go_through_dependencies() {
        let mut config = SessionConfig::default();
        config
            .presets
            .prover9
            .insert("max_hours".to_string(), OptionValue::Int(1));
        let session = config.session().unwrap();
        assert_eq!(
            session.value_of(ProgramKind::Prover9, "max_seconds"),
            Some(&OptionValue::Int(3600))
        );
    }

    #[test]
    fn test_invalid_preset_is_reported() {
        let mut config = SessionConfig::default();
        config
            .presets
            .mace4
            .insert("selection_order".to_string(), OptionValue::Int(9));
        assert!(config.session().unwrap_err().is_option());
    }

    #[test]
    fn test_parse_error() {
        let err = SessionConfig::from_toml_str("poll_interval_ms = \"fast\"", "bad.toml").unwrap_err();
        assert!(err.is_config_parse());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = SessionConfig {
            poll_interval_ms: 10,
            report_stderr: -1,
            ..SessionConfig::default()
        };
        config
            .presets
            .mace4
            .insert("iterate".to_string(), OptionValue::from("primes"));
        config.save_to_toml(&path).unwrap();

        assert_eq!(SessionConfig::load_from_toml(&path).unwrap(), config);
    }
}
