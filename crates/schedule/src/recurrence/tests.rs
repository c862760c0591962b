//! Tests for the recurrence model and evaluator.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};

use super::*;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

fn weekly(day: Weekday) -> RecurrenceDescriptor {
    RecurrenceDescriptor::new(Recurrence::Weekly { day })
}

// -- weekly ----------------------------------------------------------------

#[test]
fn weekly_matches_anchor_weekday_over_400_days() {
    let start = date(2024, 1, 1);
    for anchor in 0..7 {
        let day = weekday_from_sunday0(anchor).unwrap();
        let desc = weekly(day);
        for offset in 0..400 {
            let d = start + Duration::days(offset);
            let expected = i64::from(d.weekday().num_days_from_sunday()) == anchor;
            assert_eq!(is_due(&desc, noon(d)), expected, "anchor {anchor} on {d}");
        }
    }
}

#[test]
fn weekly_tuesday_first_two_weeks_of_2024() {
    let desc = weekly(Weekday::Tue);

    let due: Vec<NaiveDate> = date(2024, 1, 1)
        .iter_days()
        .take_while(|d| *d <= date(2024, 1, 14))
        .filter(|d| is_due(&desc, noon(*d)))
        .collect();
    assert_eq!(due, vec![date(2024, 1, 2), date(2024, 1, 9)]);

    assert_eq!(
        due_dates_between(&desc, date(2024, 1, 1), date(2024, 1, 14)),
        vec![date(2024, 1, 2), date(2024, 1, 9)]
    );
}

// -- biweekly --------------------------------------------------------------

#[test]
fn biweekly_fires_on_alternating_anchor_days() {
    for parity in [WeekParity::Odd, WeekParity::Even] {
        for anchor in [Weekday::Mon, Weekday::Wed, Weekday::Sun] {
            let desc = RecurrenceDescriptor::new(Recurrence::Biweekly { day: anchor, parity });

            let first = date(2024, 3, 1)
                .iter_days()
                .find(|d| d.weekday() == anchor)
                .unwrap();
            let hits: Vec<bool> = (0..14)
                .map(|i| is_due(&desc, noon(first + Duration::weeks(i))))
                .collect();

            assert_eq!(hits.iter().filter(|h| **h).count(), 7, "{parity:?} {anchor}");
            assert!(hits.windows(2).all(|w| w[0] != w[1]), "{parity:?} {anchor} not alternating");
        }
    }
}

#[test]
fn biweekly_rate_is_half_of_weekly() {
    let weekly_desc = weekly(Weekday::Fri);
    let odd = RecurrenceDescriptor::new(Recurrence::Biweekly {
        day: Weekday::Fri,
        parity: WeekParity::Odd,
    });
    let even = RecurrenceDescriptor::new(Recurrence::Biweekly {
        day: Weekday::Fri,
        parity: WeekParity::Even,
    });

    let (from, to) = (date(2023, 6, 1), date(2024, 5, 29));
    let w = due_dates_between(&weekly_desc, from, to).len();
    let o = due_dates_between(&odd, from, to).len();
    let e = due_dates_between(&even, from, to).len();
    assert_eq!(w, 52);
    assert_eq!(o, 26);
    assert_eq!(e, 26);
}

#[test]
fn biweekly_parity_continues_across_year_boundary() {
    // ISO week numbers go 52 -> 1 here; epoch-based indices keep alternating.
    let last_2023 = date(2023, 12, 25);
    let first_2024 = date(2024, 1, 1);
    assert_ne!(week_parity(last_2023), week_parity(first_2024));

    // 2020 has an ISO week 53.
    let wk53 = date(2020, 12, 28);
    let wk1 = date(2021, 1, 4);
    assert_ne!(week_parity(wk53), week_parity(wk1));
}

#[test]
fn parity_epoch_is_monday_before_unix_epoch() {
    let epoch = date(1969, 12, 29);
    assert_eq!(epoch.num_days_from_ce(), PARITY_EPOCH_DAYS_FROM_CE);
    assert_eq!(epoch.weekday(), Weekday::Mon);

    assert_eq!(week_index(date(1970, 1, 1)), 0);
    assert_eq!(week_index(date(1970, 1, 4)), 0);
    assert_eq!(week_index(date(1970, 1, 5)), 1);
    assert_eq!(week_index(date(1969, 12, 28)), -1);
    assert_eq!(week_parity(date(1969, 12, 28)), WeekParity::Odd);
    assert_eq!(week_parity(date(1970, 1, 1)), WeekParity::Even);
}

// -- monthly ---------------------------------------------------------------

#[test]
fn monthly_on_the_15th_over_24_months() {
    let desc = RecurrenceDescriptor::new(Recurrence::MonthlyByDate { day: 15 });
    let mut fired = 0;
    for d in date(2024, 1, 1).iter_days().take_while(|d| *d <= date(2025, 12, 31)) {
        let due = is_due(&desc, noon(d));
        assert_eq!(due, d.day() == 15, "{d}");
        if due {
            fired += 1;
        }
    }
    assert_eq!(fired, 24);
}

#[test]
fn monthly_on_the_31st_skips_short_months() {
    let desc = RecurrenceDescriptor::new(Recurrence::MonthlyByDate { day: 31 });
    let dates = due_dates_between(&desc, date(2024, 1, 1), date(2024, 12, 31));
    let months: Vec<u32> = dates.iter().map(|d| d.month()).collect();
    assert_eq!(months, vec![1, 3, 5, 7, 8, 10, 12]);
}

// -- time of day -----------------------------------------------------------

#[test]
fn time_of_day_has_one_minute_tolerance() {
    let desc = RecurrenceDescriptor::new(Recurrence::Daily).with_time(TimeOfDay::new(9, 0).unwrap());

    assert!(is_due(&desc, at(2024, 5, 6, 9, 0)));
    assert!(is_due(&desc, at(2024, 5, 6, 9, 1)));
    assert!(!is_due(&desc, at(2024, 5, 6, 9, 2)));
    assert!(!is_due(&desc, at(2024, 5, 6, 8, 58)));
}

#[test]
fn time_of_day_window_does_not_cross_the_hour() {
    let desc = RecurrenceDescriptor::new(Recurrence::Daily).with_time(TimeOfDay::new(9, 0).unwrap());
    assert!(!is_due(&desc, at(2024, 5, 6, 8, 59)));

    let half = RecurrenceDescriptor::new(Recurrence::Daily).with_time(TimeOfDay::new(14, 30).unwrap());
    assert!(is_due(&half, at(2024, 5, 6, 14, 29)));
    assert!(is_due(&half, at(2024, 5, 6, 14, 31)));
}

#[test]
fn daily_without_time_is_due_every_day() {
    let desc = RecurrenceDescriptor::new(Recurrence::Daily);
    for d in date(2024, 2, 1).iter_days().take(60) {
        assert!(is_due(&desc, noon(d)));
    }
}

// -- fire history ----------------------------------------------------------

#[test]
fn fired_earlier_today_suppresses() {
    let desc = RecurrenceDescriptor::new(Recurrence::Daily)
        .with_time(TimeOfDay::new(9, 0).unwrap())
        .fired_at(at(2024, 5, 6, 9, 0));
    assert!(!is_due(&desc, at(2024, 5, 6, 9, 1)));
}

#[test]
fn fired_yesterday_does_not_suppress() {
    let desc = RecurrenceDescriptor::new(Recurrence::Daily)
        .with_time(TimeOfDay::new(9, 0).unwrap())
        .fired_at(at(2024, 5, 5, 9, 0));
    assert!(is_due(&desc, at(2024, 5, 6, 9, 0)));
}

// -- end date --------------------------------------------------------------

#[test]
fn end_date_blocks_every_kind() {
    let end = date(2024, 1, 10);
    let query = date(2024, 1, 11);
    let rules = [
        Recurrence::Daily,
        Recurrence::Weekly { day: query.weekday() },
        Recurrence::Biweekly {
            day: query.weekday(),
            parity: week_parity(query),
        },
        Recurrence::MonthlyByDate { day: 11 },
        Recurrence::Once(OneShot::Date(query)),
        Recurrence::Once(OneShot::At(noon(query) - Duration::hours(1))),
    ];

    for rule in rules {
        let open = RecurrenceDescriptor::new(rule);
        assert!(is_due(&open, noon(query)), "{rule:?} should match without end date");
        assert!(!is_due(&open.until(end), noon(query)), "{rule:?} fired past end date");
    }
}

#[test]
fn end_date_is_inclusive() {
    let desc = RecurrenceDescriptor::new(Recurrence::Daily).until(date(2024, 1, 10));
    assert!(is_due(&desc, at(2024, 1, 10, 23, 59)));
    assert!(!matches_date(&desc, date(2024, 1, 11)));
}

// -- one-shot --------------------------------------------------------------

#[test]
fn one_shot_task_is_due_on_its_date_only() {
    let desc = RecurrenceDescriptor::new(Recurrence::Once(OneShot::Date(date(2024, 4, 2))));
    assert!(!is_due(&desc, noon(date(2024, 4, 1))));
    assert!(is_due(&desc, noon(date(2024, 4, 2))));
    assert!(!is_due(&desc, noon(date(2024, 4, 3))));

    let done = desc.fired_at(at(2024, 4, 2, 8, 0));
    assert!(!is_due(&done, noon(date(2024, 4, 2))));
}

#[test]
fn one_shot_notification_is_due_once_instant_has_passed() {
    let scheduled = at(2024, 4, 2, 18, 30);
    let desc = RecurrenceDescriptor::new(Recurrence::Once(OneShot::At(scheduled)));
    assert!(!is_due(&desc, at(2024, 4, 2, 18, 29)));
    assert!(is_due(&desc, scheduled));
    assert!(is_due(&desc, at(2024, 4, 3, 7, 0)));

    let sent = desc.fired_at(scheduled);
    assert!(!is_due(&sent, at(2024, 4, 3, 7, 0)));
}

// -- persisted records -----------------------------------------------------

#[test]
fn record_round_trips_through_json() {
    let json = r#"{"kind":"biweekly","day_of_week":5,"parity":"odd","time":"09:30","end_date":"2024-12-31"}"#;
    let desc: RecurrenceDescriptor = serde_json::from_str(json).unwrap();
    assert_eq!(
        desc.rule,
        Recurrence::Biweekly {
            day: Weekday::Fri,
            parity: WeekParity::Odd
        }
    );
    assert_eq!(desc.time_of_day, Some(TimeOfDay::new(9, 30).unwrap()));

    let back = serde_json::to_value(&desc).unwrap();
    assert_eq!(back["day_of_week"], 5);
    assert_eq!(back["time_of_day"], "09:30");
    assert!(back.get("day_of_month").is_none());
}

#[test]
fn record_missing_anchor_is_invalid() {
    let rec = RecurrenceRecord {
        kind: RecurrenceKind::Weekly,
        ..Default::default()
    };
    assert_eq!(
        RecurrenceDescriptor::try_from(rec),
        Err(InvalidDescriptor::MissingField {
            kind: RecurrenceKind::Weekly,
            field: "day_of_week"
        })
    );
}

#[test]
fn record_with_both_anchors_is_invalid() {
    let rec = RecurrenceRecord {
        kind: RecurrenceKind::Weekly,
        day_of_week: Some(1),
        day_of_month: Some(1),
        ..Default::default()
    };
    assert!(matches!(
        RecurrenceDescriptor::try_from(rec),
        Err(InvalidDescriptor::UnexpectedField { field: "day_of_month", .. })
    ));
}

#[test]
fn record_parity_outside_biweekly_is_invalid() {
    let rec = RecurrenceRecord {
        kind: RecurrenceKind::Weekly,
        day_of_week: Some(1),
        parity: Some(WeekParity::Even),
        ..Default::default()
    };
    assert!(matches!(
        RecurrenceDescriptor::try_from(rec),
        Err(InvalidDescriptor::UnexpectedField { field: "parity", .. })
    ));
}

#[test]
fn record_ranges_are_checked() {
    let weekday = RecurrenceRecord {
        kind: RecurrenceKind::Weekly,
        day_of_week: Some(7),
        ..Default::default()
    };
    assert!(matches!(
        RecurrenceDescriptor::try_from(weekday),
        Err(InvalidDescriptor::OutOfRange { field: "day_of_week", value: 7, .. })
    ));

    let monthday = RecurrenceRecord {
        kind: RecurrenceKind::MonthlyByDate,
        day_of_month: Some(0),
        ..Default::default()
    };
    assert!(matches!(
        RecurrenceDescriptor::try_from(monthday),
        Err(InvalidDescriptor::OutOfRange { field: "day_of_month", .. })
    ));
}

#[test]
fn record_one_shot_needs_exactly_one_target() {
    let neither = RecurrenceRecord::default();
    assert_eq!(
        RecurrenceDescriptor::try_from(neither),
        Err(InvalidDescriptor::AmbiguousOneShot)
    );

    let both = RecurrenceRecord {
        due_date: Some(date(2024, 1, 1)),
        scheduled_at: Some(at(2024, 1, 1, 9, 0)),
        ..Default::default()
    };
    assert_eq!(
        RecurrenceDescriptor::try_from(both),
        Err(InvalidDescriptor::AmbiguousOneShot)
    );

    let due_on_daily = RecurrenceRecord {
        kind: RecurrenceKind::Daily,
        due_date: Some(date(2024, 1, 1)),
        ..Default::default()
    };
    assert!(matches!(
        RecurrenceDescriptor::try_from(due_on_daily),
        Err(InvalidDescriptor::UnexpectedField { field: "due_date", .. })
    ));
}

#[test]
fn record_time_with_instant_is_invalid() {
    let rec = RecurrenceRecord {
        scheduled_at: Some(at(2024, 1, 1, 9, 0)),
        time_of_day: Some("09:00".to_string()),
        ..Default::default()
    };
    assert_eq!(
        RecurrenceDescriptor::try_from(rec),
        Err(InvalidDescriptor::TimeWithInstant)
    );
}

#[test]
fn time_of_day_parsing() {
    assert_eq!("09:05".parse::<TimeOfDay>().unwrap().to_string(), "09:05");
    assert_eq!("9:05".parse::<TimeOfDay>().unwrap().to_string(), "09:05");
    assert_eq!("18:45:00".parse::<TimeOfDay>().unwrap().to_string(), "18:45");
    assert!("24:00".parse::<TimeOfDay>().is_err());
    assert!("12:60".parse::<TimeOfDay>().is_err());
    assert!("12:5".parse::<TimeOfDay>().is_err());
    assert!("noon".parse::<TimeOfDay>().is_err());
    assert!("12:00:00:00".parse::<TimeOfDay>().is_err());
}

#[test]
fn evaluate_record_fails_closed() {
    let broken = RecurrenceRecord {
        kind: RecurrenceKind::Biweekly,
        day_of_week: Some(2),
        ..Default::default()
    };
    assert!(!evaluate_record("broken", &broken, at(2024, 1, 2, 9, 0)));

    let fine = RecurrenceRecord {
        kind: RecurrenceKind::Weekly,
        day_of_week: Some(2),
        ..Default::default()
    };
    assert!(evaluate_record("fine", &fine, at(2024, 1, 2, 9, 0)));
}

#[test]
fn validate_catches_hand_built_descriptors() {
    let bad_day = RecurrenceDescriptor::new(Recurrence::MonthlyByDate { day: 32 });
    assert!(bad_day.validate().is_err());
    assert!(!is_due(&bad_day, noon(date(2024, 1, 31))));

    let bad_combo = RecurrenceDescriptor::new(Recurrence::Once(OneShot::At(at(2024, 1, 1, 9, 0))))
        .with_time(TimeOfDay::new(9, 0).unwrap());
    assert_eq!(bad_combo.validate(), Err(InvalidDescriptor::TimeWithInstant));
}
