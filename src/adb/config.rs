//! Configuration for the command bridge

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Port used by the MuMu emulator's adb endpoint.
pub const DEFAULT_CONNECT_PORT: u16 = 7555;
/// Default width of the worker pool and of the in-flight limiter.
pub const DEFAULT_MAX_WORKERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Path to the adb executable. `None` means "ask a locator".
    pub adb_path: Option<PathBuf>,
    /// Local port passed to `adb connect 127.0.0.1:<port>` on bootstrap.
    pub connect_port: Option<u16>,
    /// Maximum number of concurrently running adb processes for async calls.
    pub max_workers: usize,
    /// Hide the console window adb would otherwise open (Windows only).
    pub suppress_window: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            adb_path: None,
            connect_port: Some(DEFAULT_CONNECT_PORT),
            max_workers: DEFAULT_MAX_WORKERS,
            suppress_window: true,
        }
    }
}

impl BridgeConfig {
    pub fn with_adb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.adb_path = Some(path.into());
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn without_connect(mut self) -> Self {
        self.connect_port = None;
        self
    }

    /// Defaults overlaid with `ADB_PATH`, `ADB_CONNECT_PORT`, `ADB_MAX_WORKERS`
    /// and `ADB_SHOW_WINDOW`. Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("ADB_PATH").filter(|p| !p.trim().is_empty()) {
            self.adb_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("ADB_CONNECT_PORT") {
            match raw.trim().parse::<u16>() {
                Ok(0) => self.connect_port = None,
                Ok(port) => self.connect_port = Some(port),
                Err(_) => log::warn!("Ignoring invalid ADB_CONNECT_PORT={raw:?}"),
            }
        }
        if let Some(raw) = lookup("ADB_MAX_WORKERS") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.max_workers = n,
                _ => log::warn!("Ignoring invalid ADB_MAX_WORKERS={raw:?}"),
            }
        }
        if let Some(raw) = lookup("ADB_SHOW_WINDOW") {
            self.suppress_window = !matches!(raw.trim(), "1" | "true" | "yes");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overlay_with(pairs: &[(&str, &str)]) -> BridgeConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BridgeConfig::default().overlay(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.adb_path, None);
        assert_eq!(config.connect_port, Some(7555));
        assert_eq!(config.max_workers, 10);
        assert!(config.suppress_window);
    }

    #[test]
    fn env_overrides() {
        let config = overlay_with(&[
            ("ADB_PATH", "/opt/platform-tools/adb"),
            ("ADB_CONNECT_PORT", "5555"),
            ("ADB_MAX_WORKERS", "4"),
            ("ADB_SHOW_WINDOW", "true"),
        ]);
        assert_eq!(config.adb_path, Some(PathBuf::from("/opt/platform-tools/adb")));
        assert_eq!(config.connect_port, Some(5555));
        assert_eq!(config.max_workers, 4);
        assert!(!config.suppress_window);
    }

    #[test]
    fn zero_port_disables_connect_and_bad_values_are_ignored() {
        let config = overlay_with(&[("ADB_CONNECT_PORT", "0"), ("ADB_MAX_WORKERS", "lots")]);
        assert_eq!(config.connect_port, None);
        assert_eq!(config.max_workers, DEFAULT_MAX_WORKERS);
    }
}
