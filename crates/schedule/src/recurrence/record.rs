//! Flat, persisted form of a recurrence descriptor.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::descriptor::{
    weekday_from_sunday0, OneShot, Recurrence, RecurrenceDescriptor, RecurrenceKind, TimeOfDay,
    WeekParity,
};
use super::error::InvalidDescriptor;

/// A recurrence descriptor as a database row or YAML mapping carries it:
/// every field optional, nothing cross-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRecord {
    #[serde(default)]
    pub kind: RecurrenceKind,
    /// 0-6, Sunday = 0.
    #[serde(default, alias = "anchor_day_of_week", skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parity: Option<WeekParity>,
    #[serde(default, alias = "anchor_day_of_month", skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<i64>,
    #[serde(default, alias = "time", skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fired_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

fn forbid(
    kind: RecurrenceKind,
    field: &'static str,
    present: bool,
) -> Result<(), InvalidDescriptor> {
    if present {
        Err(InvalidDescriptor::UnexpectedField { kind, field })
    } else {
        Ok(())
    }
}

fn require<T>(
    kind: RecurrenceKind,
    field: &'static str,
    value: Option<T>,
) -> Result<T, InvalidDescriptor> {
    value.ok_or(InvalidDescriptor::MissingField { kind, field })
}

fn anchor_weekday(kind: RecurrenceKind, value: Option<i64>) -> Result<Weekday, InvalidDescriptor> {
    let n = require(kind, "day_of_week", value)?;
    weekday_from_sunday0(n).ok_or(InvalidDescriptor::OutOfRange {
        field: "day_of_week",
        value: n,
        min: 0,
        max: 6,
    })
}

impl TryFrom<RecurrenceRecord> for RecurrenceDescriptor {
    type Error = InvalidDescriptor;

    fn try_from(rec: RecurrenceRecord) -> Result<Self, Self::Error> {
        use RecurrenceKind as K;
        let kind = rec.kind;

        forbid(kind, "day_of_week", rec.day_of_week.is_some() && !matches!(kind, K::Weekly | K::Biweekly))?;
        forbid(kind, "parity", rec.parity.is_some() && kind != K::Biweekly)?;
        forbid(kind, "day_of_month", rec.day_of_month.is_some() && kind != K::MonthlyByDate)?;
        forbid(kind, "due_date", rec.due_date.is_some() && kind != K::None)?;
        forbid(kind, "scheduled_at", rec.scheduled_at.is_some() && kind != K::None)?;

        let rule = match kind {
            K::None => match (rec.due_date, rec.scheduled_at) {
                (Some(date), None) => Recurrence::Once(OneShot::Date(date)),
                (None, Some(at)) => Recurrence::Once(OneShot::At(at)),
                _ => return Err(InvalidDescriptor::AmbiguousOneShot),
            },
            K::Daily => Recurrence::Daily,
            K::Weekly => Recurrence::Weekly {
                day: anchor_weekday(kind, rec.day_of_week)?,
            },
            K::Biweekly => Recurrence::Biweekly {
                day: anchor_weekday(kind, rec.day_of_week)?,
                parity: require(kind, "parity", rec.parity)?,
            },
            K::MonthlyByDate => {
                let n = require(kind, "day_of_month", rec.day_of_month)?;
                if !(1..=31).contains(&n) {
                    return Err(InvalidDescriptor::OutOfRange {
                        field: "day_of_month",
                        value: n,
                        min: 1,
                        max: 31,
                    });
                }
                Recurrence::MonthlyByDate { day: n as u8 }
            }
        };

        let time_of_day = rec
            .time_of_day
            .as_deref()
            .map(str::parse::<TimeOfDay>)
            .transpose()?;

        let descriptor = RecurrenceDescriptor {
            rule,
            time_of_day,
            end_date: rec.end_date,
            last_fired_at: rec.last_fired_at,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

impl From<RecurrenceDescriptor> for RecurrenceRecord {
    fn from(d: RecurrenceDescriptor) -> Self {
        let mut rec = RecurrenceRecord {
            kind: d.kind(),
            time_of_day: d.time_of_day.map(|t| t.to_string()),
            end_date: d.end_date,
            last_fired_at: d.last_fired_at,
            ..Default::default()
        };
        match d.rule {
            Recurrence::Once(OneShot::Date(date)) => rec.due_date = Some(date),
            Recurrence::Once(OneShot::At(at)) => rec.scheduled_at = Some(at),
            Recurrence::Daily => {}
            Recurrence::Weekly { day } => {
                rec.day_of_week = Some(i64::from(day.num_days_from_sunday()));
            }
            Recurrence::Biweekly { day, parity } => {
                rec.day_of_week = Some(i64::from(day.num_days_from_sunday()));
                rec.parity = Some(parity);
            }
            Recurrence::MonthlyByDate { day } => rec.day_of_month = Some(i64::from(day)),
        }
        rec
    }
}
