use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use crate::models::family::FamilyDocument;
use crate::models::reminder::{ItemType, ReminderRecord};

/// Fixed offset rules. Anything else is ignored rather than rejected, so an
/// older client sending a label this build does not know simply schedules
/// fewer reminders.
fn offset_duration(label: &str) -> Option<Duration> {
    match label {
        "1 day before" => Some(Duration::days(1)),
        "2 hours before" => Some(Duration::hours(2)),
        "1 hour before" => Some(Duration::hours(1)),
        "30 minutes before" => Some(Duration::minutes(30)),
        "15 minutes before" => Some(Duration::minutes(15)),
        _ => None,
    }
}

/// Absolute fire times for an item, ascending.
pub fn compute(item_time: NaiveDateTime, offsets: &[String]) -> Vec<NaiveDateTime> {
    let mut times: Vec<NaiveDateTime> = offsets
        .iter()
        .filter_map(|label| offset_duration(label))
        .map(|offset| item_time - offset)
        .collect();
    times.sort();
    times
}

/// Rebuild the reminder records for one item after a save.
///
/// No-op when the item has no active configuration. Otherwise every existing
/// record for the item is dropped and replaced by fresh `sent=false` records,
/// one per computed fire time, capturing the configured recipient set.
/// The caller commits the snapshot afterwards.
pub fn schedule(doc: &mut FamilyDocument, item_type: ItemType, item_id: Uuid) {
    let (settings, item_time) = match item_type {
        ItemType::Event => match doc.event(item_id) {
            Some(event) => (event.reminders.clone(), Some(event.occurs_at())),
            None => return,
        },
        ItemType::Task => match doc.task(item_id) {
            Some(task) => (task.reminders.clone(), task.due_at()),
            None => return,
        },
    };

    let Some(settings) = settings else { return };
    if !settings.is_active() {
        return;
    }

    doc.reminders
        .retain(|r| !(r.item_type == item_type && r.item_id == item_id));

    // An active configuration on an undated task still ends with zero records.
    let Some(item_time) = item_time else { return };

    for fire_at in compute(item_time, &settings.offsets) {
        doc.reminders.push(ReminderRecord::new(
            item_type,
            item_id,
            fire_at,
            settings.member_ids.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::Event;
    use crate::models::reminder::ReminderSettings;
    use chrono::{NaiveDate, Utc};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn event_with(doc: &mut FamilyDocument, settings: Option<ReminderSettings>) -> Uuid {
        let id = Uuid::new_v4();
        doc.events.push(Event {
            id,
            title: "Dentist".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            time: Some(chrono::NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            description: None,
            reminders: settings,
            created_at: Utc::now(),
        });
        id
    }

    fn active(offsets: &[&str]) -> ReminderSettings {
        ReminderSettings {
            enabled: true,
            offsets: offsets.iter().map(|s| s.to_string()).collect(),
            member_ids: vec![Uuid::new_v4()],
        }
    }

    #[test]
    fn compute_sorts_ascending() {
        let times = compute(
            dt("2024-01-10T18:00:00"),
            &["1 day before".into(), "2 hours before".into()],
        );
        assert_eq!(
            times,
            vec![dt("2024-01-09T18:00:00"), dt("2024-01-10T16:00:00")]
        );
    }

    #[test]
    fn compute_ignores_unknown_labels() {
        let times = compute(
            dt("2024-01-10T18:00:00"),
            &["3 weeks before".into(), "15 minutes before".into()],
        );
        assert_eq!(times, vec![dt("2024-01-10T17:45:00")]);
    }

    #[test]
    fn compute_all_five_offsets() {
        let labels: Vec<String> = [
            "15 minutes before",
            "30 minutes before",
            "1 hour before",
            "2 hours before",
            "1 day before",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let times = compute(dt("2024-01-10T18:00:00"), &labels);
        assert_eq!(
            times,
            vec![
                dt("2024-01-09T18:00:00"),
                dt("2024-01-10T16:00:00"),
                dt("2024-01-10T17:00:00"),
                dt("2024-01-10T17:30:00"),
                dt("2024-01-10T17:45:00"),
            ]
        );
    }

    #[test]
    fn resave_replaces_records_without_accumulation() {
        let mut doc = FamilyDocument::default();
        let id = event_with(
            &mut doc,
            Some(active(&["1 day before", "1 hour before", "15 minutes before"])),
        );

        schedule(&mut doc, ItemType::Event, id);
        assert_eq!(doc.reminders.len(), 3);

        doc.events[0].reminders = Some(active(&["30 minutes before"]));
        schedule(&mut doc, ItemType::Event, id);
        assert_eq!(doc.reminders.len(), 1);
        assert_eq!(doc.reminders[0].scheduled_time, dt("2024-01-10T17:30:00"));
        assert!(!doc.reminders[0].sent);
    }

    #[test]
    fn inactive_configuration_is_a_no_op() {
        let mut doc = FamilyDocument::default();
        let id = event_with(&mut doc, Some(active(&["1 hour before"])));
        schedule(&mut doc, ItemType::Event, id);
        assert_eq!(doc.reminders.len(), 1);

        // Disabling on a later save leaves the prior records untouched.
        doc.events[0].reminders = None;
        schedule(&mut doc, ItemType::Event, id);
        assert_eq!(doc.reminders.len(), 1);
    }

    #[test]
    fn records_capture_recipients_at_schedule_time() {
        let mut doc = FamilyDocument::default();
        let settings = active(&["1 hour before"]);
        let member_ids = settings.member_ids.clone();
        let id = event_with(&mut doc, Some(settings));

        schedule(&mut doc, ItemType::Event, id);
        assert_eq!(doc.reminders[0].member_ids, member_ids);
        assert_eq!(doc.reminders[0].item_type, ItemType::Event);
        assert_eq!(doc.reminders[0].item_id, id);
    }

    #[test]
    fn only_the_saved_item_is_touched() {
        let mut doc = FamilyDocument::default();
        let first = event_with(&mut doc, Some(active(&["1 hour before"])));
        let second = event_with(&mut doc, Some(active(&["1 day before", "2 hours before"])));

        schedule(&mut doc, ItemType::Event, first);
        schedule(&mut doc, ItemType::Event, second);
        assert_eq!(doc.reminders.len(), 3);

        schedule(&mut doc, ItemType::Event, second);
        assert_eq!(doc.reminders.len(), 3);
        assert_eq!(
            doc.reminders.iter().filter(|r| r.item_id == first).count(),
            1
        );
    }
}
