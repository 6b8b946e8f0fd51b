//! Viewer configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use flut_core::SessionConfig;

/// Top-level configuration for the viewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Snapshot polling.
    pub polling: PollingConfig,
    /// What to do with received frames.
    pub output: OutputConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Pixelflut WebSocket endpoint.
    pub url: String,
    /// Connect as soon as the viewer starts.
    pub auto_connect: bool,
}

/// Snapshot polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Snapshot requests per second.
    pub update_frequency: f64,
    /// Re-request a snapshot left unanswered this long. 0 waits forever.
    pub snapshot_timeout_ms: u64,
}

/// Frame output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the last frame here as a PAM image on exit. Empty disables.
    pub dump_path: String,
    /// How often to log frame statistics, in milliseconds. 0 disables.
    pub stats_interval_ms: u64,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9876".into(),
            auto_connect: true,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            update_frequency: 5.0,
            snapshot_timeout_ms: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dump_path: String::new(),
            stats_interval_ms: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl ViewerConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write default config to a file.
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let text = toml::to_string_pretty(&Self::default()).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }

    /// Session settings for the core client.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            update_frequency: self.polling.update_frequency,
            snapshot_timeout: match self.polling.snapshot_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            ..SessionConfig::new(self.network.url.clone())
        }
    }

    /// Where to dump the last frame, if anywhere.
    pub fn dump_path(&self) -> Option<PathBuf> {
        (!self.output.dump_path.is_empty()).then(|| PathBuf::from(&self.output.dump_path))
    }

    /// Stats logging period, if enabled.
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.output.stats_interval_ms > 0)
            .then(|| Duration::from_millis(self.output.stats_interval_ms))
    }
}

// ── Tests ────────────────────────────────────────────────────────
