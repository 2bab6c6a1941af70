//! Application-level configuration loading: session budget, hold TTL, and
//! SSE channel capacity.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the service looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "COURTSIDE_BACK_CONFIG_PATH";

/// One countdown budget for the whole booking wizard, in seconds.
const DEFAULT_SESSION_BUDGET_SECONDS: u32 = 600;
/// Lifetime requested for each individual slot hold, in minutes.
const DEFAULT_HOLD_TTL_MINUTES: u32 = 5;
/// Broadcast channel capacity for the session SSE stream.
const DEFAULT_SSE_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    session_budget_seconds: u32,
    hold_ttl_minutes: u32,
    sse_capacity: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        budget = config.session_budget_seconds,
                        ttl = config.hold_ttl_minutes,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Countdown budget of one booking session, in seconds.
    pub fn session_budget_seconds(&self) -> u32 {
        self.session_budget_seconds
    }

    /// TTL requested when reserving a single slot, in minutes.
    pub fn hold_ttl_minutes(&self) -> u32 {
        self.hold_ttl_minutes
    }

    /// Capacity of the SSE broadcast channel.
    pub fn sse_capacity(&self) -> usize {
        self.sse_capacity
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_budget_seconds: DEFAULT_SESSION_BUDGET_SECONDS,
            hold_ttl_minutes: DEFAULT_HOLD_TTL_MINUTES,
            sse_capacity: DEFAULT_SSE_CAPACITY,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default = "default_session_budget")]
    session_budget_seconds: u32,
    #[serde(default = "default_hold_ttl")]
    hold_ttl_minutes: u32,
    #[serde(default = "default_sse_capacity")]
    sse_capacity: usize,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            session_budget_seconds: value.session_budget_seconds.max(1),
            hold_ttl_minutes: value.hold_ttl_minutes.max(1),
            sse_capacity: value.sse_capacity.max(1),
        }
    }
}

fn default_session_budget() -> u32 {
    DEFAULT_SESSION_BUDGET_SECONDS
}

fn default_hold_ttl() -> u32 {
    DEFAULT_HOLD_TTL_MINUTES
}

fn default_sse_capacity() -> usize {
    DEFAULT_SSE_CAPACITY
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
