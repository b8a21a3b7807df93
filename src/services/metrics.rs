use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Gauge,
};

lazy_static! {
    // ── Dispatcher ──────────────────────────────────────────────────────────
    pub static ref REMINDERS_DISPATCHED: CounterVec = register_counter_vec!(
        "familyhub_reminders_dispatched_total",
        "Reminder records marked sent, by item type",
        &["item_type"]
    )
    .unwrap();

    pub static ref REMINDER_SEND_FAILURES: Counter = register_counter!(
        "familyhub_reminder_send_failures_total",
        "Individual relay invocations that failed"
    )
    .unwrap();

    pub static ref REMINDERS_PENDING: Gauge = register_gauge!(
        "familyhub_reminders_pending",
        "Unsent reminder records in the snapshot"
    )
    .unwrap();

    // ── Relay endpoint ──────────────────────────────────────────────────────
    pub static ref SMS_RELAYED: CounterVec = register_counter_vec!(
        "familyhub_sms_relayed_total",
        "Messages forwarded to a carrier gateway, by carrier",
        &["carrier"]
    )
    .unwrap();

    pub static ref SMS_REJECTED: CounterVec = register_counter_vec!(
        "familyhub_sms_rejected_total",
        "Relay requests rejected before a send was attempted, by reason",
        &["reason"]
    )
    .unwrap();
}
