//! Recurrence checks: invariants the typed form cannot express, plus
//! combinations that are legal but probably not what the author meant.

use crate::recurrence::{OneShot, Recurrence};
use crate::schema::{ItemKind, ScheduledItem};

use super::ValidationResult;

pub(super) fn validate_recurrence(item: &ScheduledItem, result: &mut ValidationResult) {
    let rec = &item.recurrence;

    if let Err(e) = rec.validate() {
        result.error("recurrence", e.to_string());
        return;
    }

    match rec.rule {
        Recurrence::MonthlyByDate { day } if day >= 29 => {
            result.warn(
                "recurrence.day_of_month",
                format!("Day {day} does not occur in every month; those months are skipped"),
            );
        }
        Recurrence::Once(shot) => {
            let date = match shot {
                OneShot::Date(d) => d,
                OneShot::At(at) => at.date_naive(),
            };
            if rec.end_date.is_some_and(|end| date > end) {
                result.warn(
                    "recurrence.end_date",
                    "End date is before the scheduled date; this item will never fire",
                );
            }
        }
        _ => {}
    }

    if item.kind == ItemKind::Task && rec.time_of_day.is_some() {
        result.warn(
            "recurrence.time_of_day",
            "Tasks are date-only; a time of day limits the task to a window of one minute \
             either side of that time, within the same hour",
        );
    }

    if let (ItemKind::Notification, Recurrence::Once(OneShot::Date(_)), None) =
        (item.kind, rec.rule, rec.time_of_day)
    {
        result.warn(
            "recurrence.time_of_day",
            "Notification has a due date but no time; it fires at the first poll of that day",
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::recurrence::{RecurrenceDescriptor, TimeOfDay};
    use crate::validation::validate_item;

    use super::*;

    fn item(kind: ItemKind, recurrence: RecurrenceDescriptor) -> ScheduledItem {
        ScheduledItem {
            id: "item-1".to_string(),
            kind,
            title: "Item".to_string(),
            body: None,
            assignee: None,
            enabled: true,
            tags: vec![],
            channels: vec![],
            recurrence,
        }
    }

    #[test]
    fn late_month_day_warns() {
        let result = validate_item(&item(
            ItemKind::Task,
            RecurrenceDescriptor::new(Recurrence::MonthlyByDate { day: 30 }),
        ));
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "recurrence.day_of_month");
    }

    #[test]
    fn end_before_one_shot_warns() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let result = validate_item(&item(
            ItemKind::Task,
            RecurrenceDescriptor::new(Recurrence::Once(OneShot::Date(due))).until(end),
        ));
        assert!(result.valid);
        assert_eq!(result.warnings[0].path, "recurrence.end_date");
    }

    #[test]
    fn task_with_time_warns() {
        let result = validate_item(&item(
            ItemKind::Task,
            RecurrenceDescriptor::new(Recurrence::Daily).with_time(TimeOfDay::new(7, 0).unwrap()),
        ));
        assert!(result.valid);
        assert_eq!(result.warnings[0].path, "recurrence.time_of_day");
        assert!(result.warnings[0].message.contains("one minute either side"));
    }

    #[test]
    fn hand_built_invalid_descriptor_is_error() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let result = validate_item(&item(
            ItemKind::Notification,
            RecurrenceDescriptor::new(Recurrence::Once(OneShot::At(at)))
                .with_time(TimeOfDay::new(9, 0).unwrap()),
        ));
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "recurrence");
    }

    #[test]
    fn bad_id_suggests_slug() {
        let mut it = item(ItemKind::Task, RecurrenceDescriptor::new(Recurrence::Daily));
        it.id = "Limpar Chapa".to_string();
        let result = validate_item(&it);
        assert!(!result.valid);
        assert_eq!(result.errors[0].suggestion.as_deref(), Some("Did you mean 'limpar-chapa'?"));
    }

    #[test]
    fn empty_title_is_error() {
        let mut it = item(ItemKind::Task, RecurrenceDescriptor::new(Recurrence::Daily));
        it.title = "   ".to_string();
        let result = validate_item(&it);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "title");
    }
}
