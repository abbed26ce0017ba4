//! Service configuration loaded from environment variables.
//!
//! Loaded once at startup and passed explicitly to the pieces that need it.

use std::env;
use std::time::Duration;

use chrono_tz::Tz;
use trip_clock::{parse_timezone, DEFAULT_COUNTRY_CODE, DEFAULT_EXTENSION_HOURS};

use crate::error::WatchError;
use crate::policy::IntervalPolicy;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Zone in which trip dates and slots are interpreted.
    pub timezone: Tz,
    /// Location sampling intervals.
    pub location_intervals: IntervalPolicy,
    /// How often the deadline watcher looks for overdue trips.
    pub deadline_check_interval: Duration,
    /// Hours added by a trip extension.
    pub extension_hours: i64,
    /// Country code prefixed to national phone numbers.
    pub sms_country_code: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Riyadh,
            location_intervals: IntervalPolicy::default(),
            deadline_check_interval: Duration::from_secs(30),
            extension_hours: DEFAULT_EXTENSION_HOURS,
            sms_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl WatchConfig {
    /// Load from the process environment, reading `.env` if present.
    pub fn load() -> Result<Self, WatchError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WatchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timezone = match lookup("TRIP_TIMEZONE") {
            Some(name) => parse_timezone(&name)?,
            None => defaults.timezone,
        };

        let weak = parse_secs(&lookup, "LOCATION_INTERVAL_WEAK_SECS")?
            .unwrap_or(defaults.location_intervals.weak);
        let strong = parse_secs(&lookup, "LOCATION_INTERVAL_STRONG_SECS")?
            .unwrap_or(defaults.location_intervals.strong);
        let deadline_check_interval = parse_secs(&lookup, "DEADLINE_CHECK_INTERVAL_SECS")?
            .unwrap_or(defaults.deadline_check_interval);

        let extension_hours = match lookup("EXTENSION_HOURS") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| WatchError::Config(format!("EXTENSION_HOURS: '{v}'")))?,
            None => defaults.extension_hours,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(WatchError::Config(format!("LOG_FORMAT: '{other}'")));
            }
        };

        Ok(Self {
            timezone,
            location_intervals: IntervalPolicy { weak, strong },
            deadline_check_interval,
            extension_hours,
            sms_country_code: lookup("SMS_COUNTRY_CODE").unwrap_or(defaults.sms_country_code),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>, WatchError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(WatchError::Config(format!("{key}: '{raw}'"))),
    }
}
