//! Resolution of the program binaries.
use std::{fmt, path::PathBuf};

use log::trace;

/// Resolves the path of an external executable.
pub trait BinaryLocator: Send + Sync {
    /// Full path of the invocable binary `name`, `None` if it cannot be run.
    fn locate(&self, name: &str) -> Option<PathBuf>;

    /// Where binaries are looked for, for error messages.
    fn describe(&self) -> String;
}

/// Searches an ordered list of directories, or `$PATH` when the list is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirLocator {
    dirs: Vec<PathBuf>,
}

impl DirLocator {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn uses_path(&self) -> bool {
        self.dirs.is_empty()
    }
}

impl fmt::Display for DirLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uses_path() {
            return f.write_str("$PATH");
        }
        let dirs: Vec<_> = self.dirs.iter().map(|dir| dir.display().to_string()).collect();
        write!(f, "[{}]", dirs.join(", "))
    }
}

impl BinaryLocator for DirLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let found = if self.uses_path() {
            which::which(name)
        } else {
            let paths = std::env::join_paths(&self.dirs).ok()?;
            let cwd = std::env::current_dir().unwrap_or_default();
            which::which_in(name, Some(paths), cwd)
        };

        match found {
            Ok(path) => Some(path),
            Err(err) => {
                trace!("`{}` not found in {}: {}", name, self, err);
                None
            }
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt};

    use super::*;

    #[test]
    fn test_locate_requires_exec_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prover9");
        fs::write(&path, "#!/bin/sh\n").unwrap();

        let locator = DirLocator::new([dir.path()]);
        assert_eq!(locator.locate("prover9"), None);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(locator.locate("prover9"), Some(path));
        assert_eq!(locator.locate("mace4"), None);
    }

    #[test]
    fn test_directories_are_not_binaries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("mace4")).unwrap();
        assert_eq!(DirLocator::new([dir.path()]).locate("mace4"), None);
    }

    #[test]
    fn test_first_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for dir in [&first, &second] {
            let path = dir.path().join("isofilter");
            fs::write(&path, "#!/bin/sh\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let locator = DirLocator::new([second.path(), first.path()]);
        assert_eq!(
            locator.locate("isofilter"),
            Some(second.path().join("isofilter"))
        );
    }

    #[test]
    fn test_empty_list_searches_path() {
        let locator = DirLocator::default();
        assert!(locator.uses_path());
        assert_eq!(locator.describe(), "$PATH");
        assert!(locator.locate("sh").is_some());
        assert_eq!(locator.locate("pm-no-such-binary-here"), None);
    }
}
