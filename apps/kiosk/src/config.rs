use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use booking_client::{ClientError, ServiceConfig};
use dispenser::{PourTiming, TimingError};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "kiosk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid pour timing: {0}")]
    Timing(#[from] TimingError),
    #[error("no anon key configured; set SUPABASE_ANON_KEY or supabase_anon_key in kiosk.toml")]
    MissingAnonKey,
    #[error("invalid backend configuration: {0}")]
    Service(#[from] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub supabase_url: String,
    pub supabase_anon_key: Option<String>,
    pub pour_duration_ms: u64,
    pub tick_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supabase_url: "http://127.0.0.1:54321".into(),
            supabase_anon_key: None,
            pour_duration_ms: 3_000,
            tick_interval_ms: 30,
            settle_delay_ms: 500,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    pour_duration_ms: Option<u64>,
    tick_interval_ms: Option<u64>,
    settle_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the config file, then the environment.
///
/// A missing `kiosk.toml` in the working directory is fine; a missing file
/// passed explicitly is an error.
pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let path = explicit_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit_path.is_none() => {}
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn apply_file(settings: &mut Settings, raw: &str) -> Result<(), ConfigError> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.supabase_url {
        settings.supabase_url = v;
    }
    if let Some(v) = file.supabase_anon_key {
        settings.supabase_anon_key = Some(v);
    }
    if let Some(v) = file.pour_duration_ms {
        settings.pour_duration_ms = v;
    }
    if let Some(v) = file.tick_interval_ms {
        settings.tick_interval_ms = v;
    }
    if let Some(v) = file.settle_delay_ms {
        settings.settle_delay_ms = v;
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SUPABASE_URL") {
        settings.supabase_url = v;
    }
    if let Some(v) = lookup("APP__SUPABASE_URL") {
        settings.supabase_url = v;
    }

    if let Some(v) = lookup("SUPABASE_ANON_KEY") {
        settings.supabase_anon_key = Some(v);
    }
    if let Some(v) = lookup("APP__SUPABASE_ANON_KEY") {
        settings.supabase_anon_key = Some(v);
    }

    let numeric = |key: &str, target: &mut u64| {
        if let Some(v) = lookup(key) {
            match v.trim().parse::<u64>() {
                Ok(parsed) => *target = parsed,
                Err(_) => warn!(key, value = %v, "ignoring non-numeric override"),
            }
        }
    };
    numeric("APP__POUR_DURATION_MS", &mut settings.pour_duration_ms);
    numeric("APP__TICK_INTERVAL_MS", &mut settings.tick_interval_ms);
    numeric("APP__SETTLE_DELAY_MS", &mut settings.settle_delay_ms);
    numeric("APP__REQUEST_TIMEOUT_SECS", &mut settings.request_timeout_secs);
}

impl Settings {
    pub fn pour_timing(&self) -> Result<PourTiming, ConfigError> {
        Ok(PourTiming::new(
            Duration::from_millis(self.pour_duration_ms),
            Duration::from_millis(self.tick_interval_ms),
            Duration::from_millis(self.settle_delay_ms),
        )?)
    }

    pub fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let anon_key = self
            .supabase_anon_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingAnonKey)?;
        Ok(ServiceConfig::new(&self.supabase_url, anon_key)?
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs)))
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
