// Finding an adb executable when none is configured.
// Downloading platform-tools is left to whoever implements BridgeLocator.
use super::error::{AdbError, AdbResult};
use std::env;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const ADB_FILE: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_FILE: &str = "adb";

/// Provides the path of a usable adb binary.
pub trait BridgeLocator {
    fn locate(&self) -> AdbResult<PathBuf>;
}

/// Searches `PATH`, then the SDK directory under the user's home.
#[derive(Debug, Default, Clone)]
pub struct DefaultLocator {
    extra_dirs: Vec<PathBuf>,
}

impl DefaultLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directories searched before anything else.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extra_dirs.push(dir.into());
        self
    }

    fn candidate_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.extra_dirs.clone();
        if let Some(path) = env::var_os("PATH") {
            dirs.extend(env::split_paths(&path));
        }
        if let Some(sdk) = env::var_os("ANDROID_HOME") {
            dirs.push(PathBuf::from(sdk).join("platform-tools"));
        }
        if let Some(home) = homedir::my_home().ok().flatten() {
            dirs.push(home.join("Android").join("Sdk").join("platform-tools"));
            dirs.push(home.join("Library").join("Android").join("sdk").join("platform-tools"));
        }
        dirs
    }
}

impl BridgeLocator for DefaultLocator {
    fn locate(&self) -> AdbResult<PathBuf> {
        let found = self
            .candidate_dirs()
            .into_iter()
            .map(|dir| dir.join(ADB_FILE))
            .find(|candidate| candidate.is_file());
        match found {
            Some(path) => {
                log::info!("Using adb at {}", path.display());
                Ok(path)
            }
            None => Err(AdbError::BinaryNotFound),
        }
    }
}

/// A locator that always answers with the same path.
#[derive(Debug, Clone)]
pub struct FixedLocator(pub PathBuf);

impl BridgeLocator for FixedLocator {
    fn locate(&self) -> AdbResult<PathBuf> {
        ensure_exists(&self.0)?;
        Ok(self.0.clone())
    }
}

fn ensure_exists(path: &Path) -> AdbResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(AdbError::BinaryMissing {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_dir_is_searched_first() {
        let dir = tempfile::tempdir().unwrap();
        let adb = dir.path().join(ADB_FILE);
        std::fs::write(&adb, b"").unwrap();

        let found = DefaultLocator::new().with_dir(dir.path()).locate().unwrap();
        assert_eq!(found, adb);
    }

    #[test]
    fn fixed_locator_checks_existence() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = FixedLocator(missing).locate().unwrap_err();
        assert!(matches!(err, AdbError::BinaryMissing { .. }));
    }
}
