//! Typed recurrence descriptor shared by tasks and notifications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::error::InvalidDescriptor;
use super::record::RecurrenceRecord;

/// Recurrence vocabulary as stored in the `kind` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Biweekly,
    MonthlyByDate,
}

impl RecurrenceKind {
    /// Wire names, in declaration order.
    pub const NAMES: &'static [&'static str] =
        &["none", "daily", "weekly", "biweekly", "monthly_by_date"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceKind::None => "none",
            RecurrenceKind::Daily => "daily",
            RecurrenceKind::Weekly => "weekly",
            RecurrenceKind::Biweekly => "biweekly",
            RecurrenceKind::MonthlyByDate => "monthly_by_date",
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which alternating weeks a biweekly item fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekParity {
    Odd,
    Even,
}

impl WeekParity {
    pub fn of_week_index(index: i64) -> Self {
        if index.rem_euclid(2) == 0 {
            WeekParity::Even
        } else {
            WeekParity::Odd
        }
    }
}

/// Wall-clock `HH:MM` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, InvalidDescriptor> {
        if hour > 23 {
            return Err(InvalidDescriptor::OutOfRange {
                field: "time_of_day.hour",
                value: i64::from(hour),
                min: 0,
                max: 23,
            });
        }
        if minute > 59 {
            return Err(InvalidDescriptor::OutOfRange {
                field: "time_of_day.minute",
                value: i64::from(minute),
                min: 0,
                max: 59,
            });
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidDescriptor;

    /// Accepts `HH:MM`, and `HH:MM:SS` as Postgres `time` columns render it
    /// (seconds are dropped).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || InvalidDescriptor::BadTimeOfDay(s.to_string());
        let mut parts = s.trim().split(':');
        let hour = parts.next().ok_or_else(bad)?;
        let minute = parts.next().ok_or_else(bad)?;
        if let Some(seconds) = parts.next() {
            seconds.parse::<u8>().map_err(|_| bad())?;
        }
        if parts.next().is_some() || hour.is_empty() || minute.len() != 2 {
            return Err(bad());
        }
        let hour: u8 = hour.parse().map_err(|_| bad())?;
        let minute: u8 = minute.parse().map_err(|_| bad())?;
        TimeOfDay::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = InvalidDescriptor;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// The single occurrence of a non-recurring item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShot {
    /// A task due on a calendar date.
    Date(NaiveDate),
    /// A notification scheduled for an instant.
    At(DateTime<Utc>),
}

/// The repetition rule proper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Once(OneShot),
    Daily,
    Weekly { day: Weekday },
    Biweekly { day: Weekday, parity: WeekParity },
    MonthlyByDate { day: u8 },
}

impl Recurrence {
    pub fn kind(&self) -> RecurrenceKind {
        match self {
            Recurrence::Once(_) => RecurrenceKind::None,
            Recurrence::Daily => RecurrenceKind::Daily,
            Recurrence::Weekly { .. } => RecurrenceKind::Weekly,
            Recurrence::Biweekly { .. } => RecurrenceKind::Biweekly,
            Recurrence::MonthlyByDate { .. } => RecurrenceKind::MonthlyByDate,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::Once(_))
    }
}

/// A recurrence rule plus the optional gates that apply on top of it.
///
/// Serialized through the flat [`RecurrenceRecord`] form; deserialization
/// rejects field combinations that contradict `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecurrenceRecord", into = "RecurrenceRecord")]
pub struct RecurrenceDescriptor {
    pub rule: Recurrence,
    pub time_of_day: Option<TimeOfDay>,
    pub end_date: Option<NaiveDate>,
    /// Set by the caller after a fire; never written by the evaluator.
    pub last_fired_at: Option<DateTime<Utc>>,
}

impl RecurrenceDescriptor {
    pub fn new(rule: Recurrence) -> Self {
        Self {
            rule,
            time_of_day: None,
            end_date: None,
            last_fired_at: None,
        }
    }

    pub fn with_time(mut self, time: TimeOfDay) -> Self {
        self.time_of_day = Some(time);
        self
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn fired_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_fired_at = Some(at);
        self
    }

    pub fn kind(&self) -> RecurrenceKind {
        self.rule.kind()
    }

    /// Re-check invariants the typed form cannot rule out on its own.
    pub fn validate(&self) -> Result<(), InvalidDescriptor> {
        match self.rule {
            Recurrence::MonthlyByDate { day } if !(1..=31).contains(&day) => {
                Err(InvalidDescriptor::OutOfRange {
                    field: "day_of_month",
                    value: i64::from(day),
                    min: 1,
                    max: 31,
                })
            }
            Recurrence::Once(OneShot::At(_)) if self.time_of_day.is_some() => {
                Err(InvalidDescriptor::TimeWithInstant)
            }
            _ => Ok(()),
        }
    }
}

/// Sunday = 0, as the day-of-week columns store it.
pub fn weekday_from_sunday0(n: i64) -> Option<Weekday> {
    match n {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
