//! Wall-clock timestamps as they arrive on the wire.
//!
//! Request timestamps are interpreted in their own wall-clock time: a trailing
//! `Z` is read as `+00:00` and any offset is kept only so the value renders back
//! the way it was written. Calendar features (hour, weekday, month) always come
//! from the wall-clock part.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid isoformat string: '{0}'")]
pub struct TimeParseError(pub String);

/// A timestamp in local wall-clock time, optionally carrying the offset it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockTime {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl BlockTime {
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    pub fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            local,
            offset: Some(offset),
        }
    }

    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Shift by `delta`, keeping the offset. `None` when the result leaves chrono's range.
    pub fn checked_add(&self, delta: Duration) -> Option<Self> {
        self.local.checked_add_signed(delta).map(|local| Self {
            local,
            offset: self.offset,
        })
    }
}

impl FromStr for BlockTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized = match trimmed
            .strip_suffix('Z')
            .or_else(|| trimmed.strip_suffix('z'))
        {
            Some(head) => format!("{head}+00:00"),
            None => trimmed.to_string(),
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
            return Ok(Self::with_offset(dt.naive_local(), *dt.offset()));
        }
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
                return Ok(Self::with_offset(dt.naive_local(), *dt.offset()));
            }
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(&normalized, fmt) {
                return Ok(Self::naive(local));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
            return Ok(Self::naive(date.and_time(NaiveTime::MIN)));
        }

        Err(TimeParseError(s.to_string()))
    }
}

impl fmt::Display for BlockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.local.nanosecond() == 0 {
            write!(f, "{}", self.local.format("%Y-%m-%dT%H:%M:%S"))?;
        } else {
            write!(f, "{}", self.local.format("%Y-%m-%dT%H:%M:%S%.6f"))?;
        }
        if let Some(offset) = self.offset {
            write!(f, "{}", offset)?;
        }
        Ok(())
    }
}

impl From<NaiveDateTime> for BlockTime {
    fn from(local: NaiveDateTime) -> Self {
        Self::naive(local)
    }
}

impl Serialize for BlockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-06-15T08:00:00", "2024-06-15T08:00:00")]
    #[case("2024-06-15T08:00:00Z", "2024-06-15T08:00:00+00:00")]
    #[case("2024-06-15T08:00:00+05:30", "2024-06-15T08:00:00+05:30")]
    #[case("2024-06-15T08:00", "2024-06-15T08:00:00")]
    #[case("2024-06-15 08:00:00.250", "2024-06-15T08:00:00.250000")]
    #[case("2024-06-15T08:00:00.123456789", "2024-06-15T08:00:00.123456")]
    #[case("2024-06-15", "2024-06-15T00:00:00")]
    #[case("1/1/2017 0:10", "2017-01-01T00:10:00")]
    fn test_parse_and_render(#[case] input: &str, #[case] rendered: &str) {
        let t: BlockTime = input.parse().unwrap();
        assert_eq!(t.to_string(), rendered);
    }

    #[test]
    fn test_offset_keeps_wall_clock_hour() {
        let t: BlockTime = "2024-06-15T23:30:00+05:30".parse().unwrap();
        assert_eq!(t.local().hour(), 23);
        assert_eq!(t.offset(), FixedOffset::east_opt(5 * 3600 + 1800));
    }

    #[test]
    fn test_invalid_timestamp() {
        let err = "tomorrow morning".parse::<BlockTime>().unwrap_err();
        assert!(err.to_string().contains("tomorrow morning"));
    }

    #[test]
    fn test_checked_add_overflow() {
        let t = BlockTime::naive(NaiveDateTime::MAX);
        assert!(t.checked_add(Duration::minutes(10)).is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let t: BlockTime = serde_json::from_str("\"2024-06-15T08:00:00Z\"").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"2024-06-15T08:00:00+00:00\"");
    }
}
