// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration loaded from TOML

use gk_core::{Charset, GatekeeperDestination};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "GATEKEEPER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "gatekeeper.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("could not determine state directory")]
    NoStateDir,
}

/// Gatekeeper daemon configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Inbound directory holding transfiles and datafiles
    pub dir: PathBuf,
    /// Directory read by the legacy system
    pub shadow_dir: PathBuf,
    /// Holds the WAL, log and pid file; resolved on load when unset
    #[serde(default)]
    pub state_dir: PathBuf,
    #[serde(default)]
    pub wal_dir: Option<PathBuf>,
    #[serde(default = "default_transfile_extensions")]
    pub transfile_extensions: Vec<String>,
    /// Age after which an incomplete transfile is dispatched anyway
    #[serde(default = "default_stalled_threshold", with = "humantime_serde")]
    pub stalled_threshold: Duration,
    #[serde(default = "default_scan_interval", with = "humantime_serde")]
    pub scan_interval: Duration,
    /// Back-off before restarting a failed dispatcher
    #[serde(default = "default_restart_delay", with = "humantime_serde")]
    pub restart_delay: Duration,
    #[serde(default = "default_watch_channel_capacity")]
    pub watch_channel_capacity: usize,
    /// Charset assumed when a transfile carries no byte order mark
    #[serde(default = "default_fallback_charset")]
    pub fallback_charset: Charset,
    /// Operator address copied on external notification mails
    #[serde(default)]
    pub cc_mail: Option<String>,
    #[serde(default)]
    pub retain_invalid_transfiles: bool,
    #[serde(default = "default_wal_compaction_threshold")]
    pub wal_compaction_threshold: u64,
    pub file_store_url: String,
    pub job_store_url: String,
    #[serde(default)]
    pub destinations: Vec<GatekeeperDestination>,
}

fn default_transfile_extensions() -> Vec<String> {
    vec![".trans".to_string(), ".trs".to_string()]
}

fn default_stalled_threshold() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_scan_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_restart_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_watch_channel_capacity() -> usize {
    256
}

fn default_fallback_charset() -> Charset {
    Charset::Latin5
}

fn default_wal_compaction_threshold() -> u64 {
    1000
}

impl Config {
    /// Load and validate the config at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate config text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        if config.state_dir.as_os_str().is_empty() {
            config.state_dir = state_dir_from(
                std::env::var_os("XDG_STATE_HOME"),
                std::env::var_os("HOME"),
            )
            .ok_or(ConfigError::NoStateDir)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dir == self.shadow_dir {
            return Err(ConfigError::Invalid(
                "dir and shadow_dir must differ".to_string(),
            ));
        }
        for (name, url) in [
            ("file_store_url", &self.file_store_url),
            ("job_store_url", &self.job_store_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }
        for (name, duration) in [
            ("stalled_threshold", self.stalled_threshold),
            ("scan_interval", self.scan_interval),
            ("restart_delay", self.restart_delay),
        ] {
            if duration.is_zero() {
                return Err(ConfigError::Invalid(format!("{} must be non-zero", name)));
            }
        }
        if self.watch_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "watch_channel_capacity must be non-zero".to_string(),
            ));
        }
        if self.transfile_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "transfile_extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn wal_dir(&self) -> PathBuf {
        self.wal_dir
            .clone()
            .unwrap_or_else(|| self.state_dir.join("wal"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("gkd.log")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("gkd.pid")
    }
}

/// `$XDG_STATE_HOME/gatekeeper`, else `$HOME/.local/state/gatekeeper`
fn state_dir_from(xdg_state_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg) = xdg_state_home.filter(|x| !x.is_empty()) {
        return Some(PathBuf::from(xdg).join("gatekeeper"));
    }
    home.filter(|h| !h.is_empty())
        .map(|h| PathBuf::from(h).join(".local/state/gatekeeper"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
