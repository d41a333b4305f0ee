//! Runtime settings
//!
//! Knobs that are not part of the rule file. Each has an environment
//! variable and a default; CLI flags override both.
//!
//! - `KEYREMAP_DELAY`: seconds to wait before sampling the active window
//!   after a property change (default `0.1`)
//! - `KEYREMAP_SOCKET`: Unix socket the shell integration writes window
//!   reports to (unset by default)

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

pub const DELAY_ENV: &str = "KEYREMAP_DELAY";
pub const SOCKET_ENV: &str = "KEYREMAP_SOCKET";

/// Window class metadata lags a focus change on most window managers.
pub const DEFAULT_WINDOW_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Wait before each active-window sample
    pub window_delay: Duration,
    /// Shell integration socket
    pub feed_socket: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_delay: DEFAULT_WINDOW_DELAY,
            feed_socket: None,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(raw) = lookup(DELAY_ENV) {
            settings.window_delay = parse_delay(DELAY_ENV, &raw)?;
        }

        if let Some(raw) = lookup(SOCKET_ENV) {
            let raw = raw.trim();
            if !raw.is_empty() {
                settings.feed_socket = Some(PathBuf::from(shellexpand::tilde(raw).as_ref()));
            }
        }

        Ok(settings)
    }
}

/// Parses a delay given in (fractional) seconds.
pub fn parse_delay(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSetting {
        name: name.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected a number of seconds"))?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid("must be a non-negative number of seconds"));
    }

    Ok(Duration::from_secs_f64(seconds))
}
