use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A calendar day as used by availability polling, written `DD-MM-YYYY`.
///
/// Gig dates use ISO `YYYY-MM-DD` and are plain [`NaiveDate`]s; the two are
/// kept as separate types so one is never read as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    #[must_use]
    pub const fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| Error::InvalidData(format!("no such date: {year}-{month}-{day}")))
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Every day of the given month, in order.
    pub fn days_in_month(year: i32, month: u32) -> Result<Vec<Self>> {
        let first = Self::from_ymd(year, month, 1)?;
        Ok(first
            .0
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(Self)
            .collect())
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d-%m-%Y"))
    }
}

impl FromStr for DayKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidData(format!("expected a DD-MM-YYYY date, got {s:?}"));

        let parts: Vec<&str> = s.split('-').collect();
        let [day, month, year] = parts.as_slice() else {
            return Err(invalid());
        };
        if day.len() != 2 || month.len() != 2 || year.len() != 4 {
            return Err(invalid());
        }
        if !s.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return Err(invalid());
        }

        let day: u32 = day.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        Self::from_ymd(year, month, day)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let day: DayKey = "05-11-2026".parse().unwrap();
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2026, 11, 5).unwrap());
        assert_eq!(day.to_string(), "05-11-2026");
    }

    #[test]
    fn test_rejects_iso_dates() {
        assert!("2026-11-05".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_rejects_unpadded_and_impossible_dates() {
        for bad in ["5-11-2026", "05-1-2026", "31-02-2026", "05/11/2026", "+5-11-2026", ""] {
            assert!(bad.parse::<DayKey>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_days_in_month() {
        let feb = DayKey::days_in_month(2028, 2).unwrap();
        assert_eq!(feb.len(), 29);
        assert_eq!(feb[0].to_string(), "01-02-2028");
        assert_eq!(feb[28].to_string(), "29-02-2028");

        assert_eq!(DayKey::days_in_month(2026, 12).unwrap().len(), 31);
        assert!(DayKey::days_in_month(2026, 13).is_err());
    }

    #[test]
    fn test_serde_uses_day_first_text() {
        let day = DayKey::from_ymd(2026, 1, 9).unwrap();
        let json = serde_json::to_string(&day).unwrap();
        assert_eq!(json, "\"09-01-2026\"");
        assert_eq!(serde_json::from_str::<DayKey>(&json).unwrap(), day);
    }
}
