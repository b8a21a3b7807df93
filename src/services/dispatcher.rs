use chrono::{Local, Timelike};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::family::FamilyDocument;
use crate::models::reminder::ReminderRecord;
use crate::services::metrics;
use crate::services::relay::truncate_message;
use crate::AppState;

/// Reminder bodies stay well under the 160-char gateway limit so the relay
/// never has to truncate a second time.
const MESSAGE_LIMIT: usize = 140;

/// What one scan should do with a due record.
#[derive(Debug, PartialEq)]
pub enum Disposition {
    /// Owning item no longer exists; drop the record without sending.
    RemoveOrphan,
    /// No deliverable recipient remains; the reminder counts as fulfilled.
    MarkFulfilled,
    /// Relay the message to each (phone, carrier) pair, in order.
    Send {
        message: String,
        recipients: Vec<(String, String)>,
    },
}

/// Pure decision step: resolve the owning item and the deliverable recipient
/// set for one due record against the current snapshot.
pub fn triage(record: &ReminderRecord, doc: &FamilyDocument) -> Disposition {
    let Some(title) = doc.item_title(record.item_type, record.item_id) else {
        return Disposition::RemoveOrphan;
    };

    let recipients: Vec<(String, String)> = doc
        .reachable_members(&record.member_ids)
        .into_iter()
        .filter_map(|m| Some((m.phone.clone()?, m.carrier.clone()?)))
        .collect();

    if recipients.is_empty() {
        return Disposition::MarkFulfilled;
    }

    Disposition::Send {
        message: truncate_message(title, MESSAGE_LIMIT),
        recipients,
    }
}

/// Spawn the dispatcher: one immediate scan (reminders that came due while
/// the process was down fire late rather than never), then a scan on every
/// minute boundary until shutdown is signalled.
pub fn start(state: AppState, mut shutdown: watch::Receiver<bool>) {
    tokio::spawn(async move {
        scan(&state).await;
        loop {
            let secs_past = Local::now().second() as u64;
            let sleep_secs = if secs_past == 0 { 60 } else { 60 - secs_past };
            tokio::select! {
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(sleep_secs)) => {
                    scan(&state).await;
                }
                _ = shutdown.changed() => {
                    info!("Reminder dispatcher stopping");
                    return;
                }
            }
        }
    });
}

/// One scan: collect due record ids, then process them strictly one at a
/// time. Sequential sends bound provider-side rate consumption; the cost is
/// latency when many reminders are due at once.
pub async fn scan(state: &AppState) {
    let now = Local::now().naive_local();

    let due: Vec<Uuid> = {
        let doc = state.doc.read().await;
        doc.reminders
            .iter()
            .filter(|r| r.is_due(now))
            .map(|r| r.id)
            .collect()
    };

    if !due.is_empty() {
        info!("{} reminder(s) due", due.len());
        for id in due {
            process(state, id).await;
        }
    }

    let pending = state
        .doc
        .read()
        .await
        .reminders
        .iter()
        .filter(|r| !r.sent)
        .count();
    metrics::REMINDERS_PENDING.set(pending as f64);
    debug!("Scan complete, {pending} reminder(s) pending");
}

async fn process(state: &AppState, record_id: Uuid) {
    // Decide under the lock; send with it released so slow network calls do
    // not stall the HTTP handlers.
    let payload = {
        let mut doc = state.doc.write().await;
        let Some(record) = doc.reminders.iter().find(|r| r.id == record_id) else {
            // Removed by a concurrent edit between collection and processing.
            return;
        };
        let item_type = record.item_type;
        let item_id = record.item_id;

        match triage(record, &doc) {
            Disposition::RemoveOrphan => {
                doc.reminders.retain(|r| r.id != record_id);
                info!("Dropped reminder for deleted {item_type} {item_id}");
                None
            }
            Disposition::MarkFulfilled => {
                if let Some(r) = doc.reminders.iter_mut().find(|r| r.id == record_id) {
                    r.sent = true;
                }
                info!("Reminder for {item_type} {item_id} has no deliverable recipients, marking sent");
                None
            }
            Disposition::Send {
                message,
                recipients,
            } => Some((item_type, message, recipients)),
        }
    };

    let Some((item_type, message, recipients)) = payload else {
        state.save_snapshot().await;
        return;
    };

    let mut delivered = false;
    for (phone, carrier) in recipients {
        match state.relay.send_sms(&phone, &carrier, &message).await {
            Ok(sent_to) => {
                delivered = true;
                info!("Reminder relayed to {sent_to}");
            }
            Err(e) => {
                metrics::REMINDER_SEND_FAILURES.inc();
                warn!("Reminder send to {phone} via {carrier} failed: {e:#}");
            }
        }
    }

    // One success is enough to retire the record; a total failure leaves it
    // pending for the next scan. There is no per-recipient tracking, so a
    // retry can duplicate a message to a recipient that already got it.
    if delivered {
        {
            let mut doc = state.doc.write().await;
            if let Some(r) = doc.reminders.iter_mut().find(|r| r.id == record_id) {
                r.sent = true;
            }
        }
        metrics::REMINDERS_DISPATCHED
            .with_label_values(&[&item_type.to_string()])
            .inc();
        state.save_snapshot().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::Member;
    use crate::models::reminder::ItemType;
    use crate::models::task::Task;
    use chrono::Utc;

    fn member(doc: &mut FamilyDocument, phone: Option<&str>, carrier: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        doc.members.push(Member {
            id,
            name: format!("m-{id}"),
            phone: phone.map(str::to_string),
            carrier: carrier.map(str::to_string),
            created_at: Utc::now(),
        });
        id
    }

    fn task(doc: &mut FamilyDocument, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        doc.tasks.push(Task {
            id,
            title: title.into(),
            assignee: None,
            due_date: None,
            due_time: None,
            description: None,
            reminders: None,
            completed: false,
            created_at: Utc::now(),
        });
        id
    }

    fn record(item_id: Uuid, member_ids: Vec<Uuid>) -> ReminderRecord {
        ReminderRecord::new(
            ItemType::Task,
            item_id,
            Utc::now().naive_utc(),
            member_ids,
        )
    }

    #[test]
    fn orphaned_record_is_removed_without_sending() {
        let mut doc = FamilyDocument::default();
        let m = member(&mut doc, Some("5551234567"), Some("verizon"));
        let rec = record(Uuid::new_v4(), vec![m]);
        assert_eq!(triage(&rec, &doc), Disposition::RemoveOrphan);
    }

    #[test]
    fn no_deliverable_recipients_marks_fulfilled() {
        let mut doc = FamilyDocument::default();
        let no_phone = member(&mut doc, None, None);
        let phone_only = member(&mut doc, Some("5551234567"), None);
        let gone = Uuid::new_v4();
        let t = task(&mut doc, "Take out trash");

        let rec = record(t, vec![no_phone, phone_only, gone]);
        assert_eq!(triage(&rec, &doc), Disposition::MarkFulfilled);
    }

    #[test]
    fn deliverable_recipients_produce_a_send() {
        let mut doc = FamilyDocument::default();
        let reachable = member(&mut doc, Some("5551234567"), Some("verizon"));
        let unreachable = member(&mut doc, None, None);
        let uninvited = member(&mut doc, Some("5559876543"), Some("att"));
        let _ = uninvited;
        let t = task(&mut doc, "Pick up groceries");

        let rec = record(t, vec![reachable, unreachable]);
        match triage(&rec, &doc) {
            Disposition::Send {
                message,
                recipients,
            } => {
                assert_eq!(message, "Pick up groceries");
                assert_eq!(
                    recipients,
                    vec![("5551234567".to_string(), "verizon".to_string())]
                );
            }
            other => panic!("expected Send, got {other:?}"),
        }
    }

    #[test]
    fn message_is_capped_at_140_chars() {
        let mut doc = FamilyDocument::default();
        let m = member(&mut doc, Some("5551234567"), Some("verizon"));
        let t = task(&mut doc, &"a".repeat(200));

        let rec = record(t, vec![m]);
        match triage(&rec, &doc) {
            Disposition::Send { message, .. } => {
                assert_eq!(message.chars().count(), 140);
                assert!(message.ends_with("..."));
            }
            other => panic!("expected Send, got {other:?}"),
        }
    }
}
