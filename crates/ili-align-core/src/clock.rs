//! Circumferential clock positions.
//!
//! Survey vendors encode the clock position of a feature in several ways:
//! some tools report a time-of-day string (`"03:00:00"`, `"6:30"`), others a
//! plain numeric hour (`3`, `3.0`, `"3"`), and many rows carry no clock at
//! all. [`ClockReading`] keeps the raw encoding as an explicit tagged variant
//! so every case is handled exhaustively, and [`ClockReading::hour`] reduces
//! any variant to a canonical hour on the 12-hour dial.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Raw clock-position encoding of a single survey record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockReading {
    /// No clock reported, or an encoding that could not be parsed.
    Missing,
    /// Colon-delimited time-of-day, e.g. `"06:30:00"`.
    TimeOfDay { hours: u32, minutes: u32, seconds: u32 },
    /// Plain numeric hour, e.g. `3` or `"3.5"`.
    NumericHour(f64),
}

impl ClockReading {
    /// Parse a raw clock cell into a reading.
    ///
    /// Never fails: anything that is not a recognizable time-of-day string or
    /// a finite number becomes [`ClockReading::Missing`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return ClockReading::Missing;
        }
        if raw.contains(':') {
            let mut parts = raw.split(':');
            let hours = parts.next().and_then(|p| p.trim().parse::<u32>().ok());
            let minutes = parts.next().map(|p| p.trim().parse::<u32>().ok());
            let seconds = parts.next().map(|p| p.trim().parse::<u32>().ok());
            return match (hours, minutes, seconds) {
                (Some(h), Some(Some(m)), None) => ClockReading::TimeOfDay {
                    hours: h,
                    minutes: m,
                    seconds: 0,
                },
                (Some(h), Some(Some(m)), Some(Some(s))) => ClockReading::TimeOfDay {
                    hours: h,
                    minutes: m,
                    seconds: s,
                },
                _ => ClockReading::Missing,
            };
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => ClockReading::NumericHour(v),
            _ => ClockReading::Missing,
        }
    }

    /// Canonical hour on the 12-hour dial, in `[0, 12)`.
    ///
    /// Missing or unparseable readings default to `0.0`. This is a silent,
    /// documented precision loss: a record with no clock is treated as
    /// top-of-pipe rather than rejected. Time-of-day readings use the hour
    /// component only, matching the vendor convention where minutes encode
    /// sub-hour detail the matcher does not weigh.
    pub fn hour(&self) -> f64 {
        match *self {
            ClockReading::Missing => 0.0,
            ClockReading::TimeOfDay { hours, .. } => f64::from(hours).rem_euclid(12.0),
            ClockReading::NumericHour(v) => {
                if v.is_finite() {
                    v.rem_euclid(12.0)
                } else {
                    0.0
                }
            }
        }
    }

    /// True when no usable clock was reported.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, ClockReading::Missing)
    }
}

impl Default for ClockReading {
    fn default() -> Self {
        ClockReading::Missing
    }
}

impl fmt::Display for ClockReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ClockReading::Missing => Ok(()),
            ClockReading::TimeOfDay {
                hours,
                minutes,
                seconds,
            } => write!(f, "{hours:02}:{minutes:02}:{seconds:02}"),
            ClockReading::NumericHour(v) => write!(f, "{v}"),
        }
    }
}

/// Circular distance between two hours on the 12-hour dial, in `[0, 6]`.
///
/// `clock_gap(11.0, 1.0)` is `2.0`, not `10.0`: the dial wraps.
#[inline]
pub fn clock_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    d.min(12.0 - d)
}

impl Serialize for ClockReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            ClockReading::Missing => serializer.serialize_str(""),
            ClockReading::TimeOfDay { .. } => serializer.serialize_str(&self.to_string()),
            ClockReading::NumericHour(v) => serializer.serialize_f64(v),
        }
    }
}

struct ClockVisitor;

impl Visitor<'_> for ClockVisitor {
    type Value = ClockReading;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a clock position as a time string, a number, or empty")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ClockReading, E> {
        Ok(ClockReading::parse(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ClockReading, E> {
        if v.is_finite() {
            Ok(ClockReading::NumericHour(v))
        } else {
            Ok(ClockReading::Missing)
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ClockReading, E> {
        Ok(ClockReading::NumericHour(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ClockReading, E> {
        Ok(ClockReading::NumericHour(v as f64))
    }

    fn visit_none<E: de::Error>(self) -> Result<ClockReading, E> {
        Ok(ClockReading::Missing)
    }

    fn visit_unit<E: de::Error>(self) -> Result<ClockReading, E> {
        Ok(ClockReading::Missing)
    }
}

impl<'de> Deserialize<'de> for ClockReading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ClockVisitor)
    }
}
