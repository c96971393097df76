use crate::error::ArchiveError;
use anyhow::Result;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn of<T: TimeZone>(at: &DateTime<T>) -> Self {
        Self::new(at.year(), at.month())
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    pub fn file_name(self) -> String {
        format!("{self}.txt")
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.strip_suffix(".txt").unwrap_or(raw);
        let (year, month) = raw.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year = year.parse::<i32>().ok()?;
        let month = month.parse::<u32>().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self::new(year, month))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Midnight on the first day of the month containing `now`, in `tz`.
pub fn start_of_month(now: DateTime<Utc>, tz: Tz) -> Result<DateTime<Tz>> {
    let local = now.with_timezone(&tz);
    tz.with_ymd_and_hms(local.year(), local.month(), 1, 0, 0, 0)
        .earliest()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no midnight at start of {}-{:02} in {tz}",
                local.year(),
                local.month()
            )
        })
}

/// Parses a `seconds.fraction` message timestamp into an instant.
pub fn parse_ts(ts: &str) -> Result<DateTime<Utc>> {
    let invalid = || ArchiveError::InvalidTimestamp(ts.to_string());
    let (secs, frac) = match ts.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (ts, ""),
    };
    let secs = secs.parse::<i64>().map_err(|_| invalid())?;
    let nanos = if frac.is_empty() {
        0
    } else {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid().into());
        }
        let mut digits = frac.chars().take(9).collect::<String>();
        while digits.len() < 9 {
            digits.push('0');
        }
        digits.parse::<u32>().map_err(|_| invalid())?
    };
    Utc.timestamp_opt(secs, nanos)
        .single()
        .ok_or_else(|| invalid().into())
}
