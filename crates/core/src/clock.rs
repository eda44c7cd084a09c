//! Time capability.
//!
//! Anything that stamps or compares times takes a `Clock` so tests can pin
//! the current instant instead of racing the wall clock.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};

use crate::error::{DomainError, DomainResult};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_iso(&self) -> String {
        iso8601(&self.now())
    }

    /// Seconds since the Unix epoch.
    fn now_unix(&self) -> i64 {
        self.now().timestamp()
    }

    /// `now + duration`, where `duration` uses the `<n>[smhd]` notation.
    fn expires_in(&self, duration: &str) -> DomainResult<DateTime<Utc>> {
        Ok(self.now() + parse_duration(duration)?)
    }

    /// A missing expiration never expires.
    fn is_expired(&self, expires_at: Option<DateTime<Utc>>) -> bool {
        expires_at.is_some_and(|at| self.now() > at)
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Default for FixedClock {
    /// `2024-01-01T00:00:00Z`.
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Render a timestamp the way every envelope carries it
/// (`2024-01-01T00:00:00.000Z`).
pub fn iso8601(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse `<digits><unit>` where unit is one of `s`, `m`, `h`, `d`.
pub fn parse_duration(raw: &str) -> DomainResult<Duration> {
    let invalid = || DomainError::invalid_duration(raw.to_string());

    let unit = raw.chars().last().ok_or_else(invalid)?;
    let digits = &raw[..raw.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    let seconds_per_unit = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(seconds_per_unit)
        .and_then(Duration::try_seconds)
        .ok_or_else(invalid)
}
