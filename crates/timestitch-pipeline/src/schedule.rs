//! Upload slot arithmetic.
//!
//! The pipeline itself never sleeps; the embedding scheduler decides when
//! a pass runs. What lives here is the pure part: parsing the configured
//! daily upload times and computing the next slot after a given moment.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid upload time '{0}': expected HH:MM")]
pub struct ScheduleError(String);

/// Sorted set of daily upload slots, e.g. `10:00,18:00`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    times: Vec<(u8, u8)>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            times: vec![(10, 0), (18, 0)],
        }
    }
}

impl FromStr for Schedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut times = Vec::new();
        for entry in s.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (hour, minute) = entry
                .split_once(':')
                .ok_or_else(|| ScheduleError(entry.to_string()))?;
            let hour: u8 = hour
                .trim()
                .parse()
                .map_err(|_| ScheduleError(entry.to_string()))?;
            let minute: u8 = minute
                .trim()
                .parse()
                .map_err(|_| ScheduleError(entry.to_string()))?;
            if hour >= 24 || minute >= 60 {
                return Err(ScheduleError(entry.to_string()));
            }
            times.push((hour, minute));
        }
        if times.is_empty() {
            return Err(ScheduleError(s.to_string()));
        }
        times.sort_unstable();
        times.dedup();
        Ok(Self { times })
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (hour, minute)) in self.times.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{hour:02}:{minute:02}")?;
        }
        Ok(())
    }
}

impl Schedule {
    pub fn times(&self) -> &[(u8, u8)] {
        &self.times
    }

    /// The first upload slot strictly after `now`. Rolls over to the
    /// first slot of the next day when today's slots have all passed.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        for &(hour, minute) in &self.times {
            let slot = now
                .date()
                .and_time(NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0).unwrap());
            if slot > now {
                return slot;
            }
        }
        let (hour, minute) = self.times[0];
        (now.date() + TimeDelta::days(1))
            .and_time(NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0).unwrap())
    }
}
