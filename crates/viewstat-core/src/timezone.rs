//! Timezone utilities for interval alignment
//!
//! Interval boundaries are counted from local midnight, so the grid depends
//! on which timezone the viewer reads the chart in. This module detects the
//! system's local timezone and parses timezone strings from user input.

use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone used for grid alignment and labels
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        let tz = get_local_timezone();
        Self {
            is_utc: tz == Tz::UTC,
            tz,
        }
    }
}

impl TimezoneConfig {
    /// UTC configuration, independent of the host
    pub fn utc() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
        }
    }

    /// Create a new timezone configuration from CLI arguments
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> crate::error::Result<Self> {
        if use_utc {
            return Ok(Self::utc());
        }

        if let Some(tz_str) = timezone_str {
            let tz = Tz::from_str(tz_str).map_err(|_| {
                crate::error::ViewstatError::InvalidTimezone(format!(
                    "'{}'. Use format like 'America/New_York', 'Europe/Madrid', or 'UTC'",
                    tz_str
                ))
            })?;
            Ok(Self {
                tz,
                is_utc: tz == Tz::UTC,
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }
}

/// Detect the system's local timezone
///
/// Checks the `TZ` environment variable first, then asks the OS.
/// Falls back to UTC if neither yields a known zone.
pub fn get_local_timezone() -> Tz {
    #[allow(clippy::collapsible_if)]
    if let Ok(tz_str) = std::env::var("TZ") {
        if let Ok(tz) = Tz::from_str(&tz_str) {
            debug!("Using timezone from TZ environment variable: {}", tz_str);
            return tz;
        }
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone from iana-time-zone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!(
                    "Could not parse timezone from iana-time-zone: '{}', falling back to UTC",
                    tz_str
                );
                Tz::UTC
            }
        },
        Err(e) => {
            debug!(
                "Could not detect local timezone via iana-time-zone: {:?}, falling back to UTC",
                e
            );
            Tz::UTC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ENV_MUTEX, EnvVarGuard};

    #[test]
    fn test_timezone_config_utc() {
        let config = TimezoneConfig::from_cli(Some("Asia/Tokyo"), true).unwrap();
        assert!(config.is_utc);
        assert_eq!(config.tz, Tz::UTC);
        assert_eq!(config.display_name(), "UTC");
    }

    #[test]
    fn test_timezone_config_explicit() {
        let config = TimezoneConfig::from_cli(Some("Europe/Madrid"), false).unwrap();
        assert!(!config.is_utc);
        assert_eq!(config.display_name(), "Europe/Madrid");
    }

    #[test]
    fn test_timezone_config_invalid() {
        let result = TimezoneConfig::from_cli(Some("Mars/Olympus_Mons"), false);
        assert!(matches!(
            result,
            Err(crate::error::ViewstatError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_timezone_config_utc_via_timezone_flag() {
        let config = TimezoneConfig::from_cli(Some("UTC"), false).unwrap();
        assert!(config.is_utc);
        assert_eq!(config.tz, Tz::UTC);
    }

    #[test]
    fn test_local_timezone_from_env() {
        let _lock = ENV_MUTEX.blocking_lock();
        let mut guard = EnvVarGuard::new();
        guard.set("TZ", "America/Mexico_City");
        assert_eq!(get_local_timezone(), chrono_tz::America::Mexico_City);
    }
}
