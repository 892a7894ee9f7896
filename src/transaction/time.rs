//! Millisecond timestamps (RFC 3339 on the wire) and TTL durations
//! (`"30m"`, `"1h 30m"`, `"1day"`)

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::TransactionError;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    pub fn now() -> Self {
        Timestamp(u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0))
    }

    pub fn millis(&self) -> u64 {
        self.0
    }
}

impl FromStr for Timestamp {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = DateTime::parse_from_rfc3339(s.trim())
            .map_err(|e| TransactionError::InvalidTimestamp(format!("{}: {}", s, e)))?;
        u64::try_from(parsed.timestamp_millis())
            .map(Timestamp)
            .map_err(|_| TransactionError::InvalidTimestamp(format!("{} is before the epoch", s)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match i64::try_from(self.0).ok().and_then(|ms| Utc.timestamp_millis_opt(ms).single()) {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Duration in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeDiff(u64);

impl TimeDiff {
    pub fn from_millis(millis: u64) -> Self {
        TimeDiff(millis)
    }

    pub fn from_minutes(minutes: u64) -> Self {
        TimeDiff(minutes.saturating_mul(MS_PER_MINUTE))
    }

    pub fn millis(&self) -> u64 {
        self.0
    }
}

fn unit_millis(unit: &str) -> Option<u64> {
    let ms = match unit {
        "ms" | "msec" | "millis" => 1,
        "s" | "sec" | "secs" | "second" | "seconds" => MS_PER_SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => MS_PER_MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => MS_PER_HOUR,
        "d" | "day" | "days" => MS_PER_DAY,
        _ => return None,
    };
    Some(ms)
}

impl FromStr for TimeDiff {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransactionError::InvalidTtl(s.to_string());
        let mut total: u64 = 0;
        let mut rest = s.trim();
        if rest.is_empty() {
            return Err(invalid());
        }

        while !rest.is_empty() {
            let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits_end == 0 {
                return Err(invalid());
            }
            let amount: u64 = rest[..digits_end].parse().map_err(|_| invalid())?;
            rest = &rest[digits_end..];

            let unit_end = rest
                .find(|c: char| c.is_ascii_digit() || c.is_whitespace())
                .unwrap_or(rest.len());
            let unit = unit_millis(&rest[..unit_end]).ok_or_else(invalid)?;
            rest = rest[unit_end..].trim_start();

            total = amount
                .checked_mul(unit)
                .and_then(|ms| total.checked_add(ms))
                .ok_or_else(invalid)?;
        }
        Ok(TimeDiff(total))
    }
}

impl fmt::Display for TimeDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }

        let days = self.0 / MS_PER_DAY;
        let parts = [
            (self.0 % MS_PER_DAY / MS_PER_HOUR, "h"),
            (self.0 % MS_PER_HOUR / MS_PER_MINUTE, "m"),
            (self.0 % MS_PER_MINUTE / MS_PER_SECOND, "s"),
            (self.0 % MS_PER_SECOND, "ms"),
        ];

        let mut out = Vec::new();
        match days {
            0 => {}
            1 => out.push("1day".to_string()),
            n => out.push(format!("{}days", n)),
        }
        out.extend(parts.iter().filter(|(n, _)| *n > 0).map(|(n, unit)| format!("{}{}", n, unit)));
        f.write_str(&out.join(" "))
    }
}

impl Serialize for TimeDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeDiff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
