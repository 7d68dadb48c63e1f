use crate::format::{display_value, format_date, format_price, format_time_range, service_label};
use crate::models::{AppointmentSnapshot, DiffRow, NotificationRecord, Status};
use serde_json::Value;
use std::collections::HashMap;

/// Records linked to an appointment collapse per appointment; the rest
/// stand alone under their own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Appointment(i64),
    Record(i64),
}

impl GroupKey {
    pub fn of(record: &NotificationRecord) -> Self {
        match record.appointment {
            Some(appointment) => GroupKey::Appointment(appointment.id),
            None => GroupKey::Record(record.id),
        }
    }
}

/// One representative per group, in first-seen group order.
pub fn deduplicate(records: Vec<NotificationRecord>) -> Vec<NotificationRecord> {
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut representatives: Vec<NotificationRecord> = Vec::new();

    for candidate in records {
        match slots.get(&GroupKey::of(&candidate)) {
            Some(&slot) => {
                if supersedes(&candidate, &representatives[slot]) {
                    representatives[slot] = candidate;
                }
            }
            None => {
                slots.insert(GroupKey::of(&candidate), representatives.len());
                representatives.push(candidate);
            }
        }
    }

    representatives
}

fn supersedes(candidate: &NotificationRecord, current: &NotificationRecord) -> bool {
    let candidate_pending = candidate.status == Status::Pending;
    let current_pending = current.status == Status::Pending;
    if candidate_pending != current_pending {
        return candidate_pending;
    }
    match (candidate.timestamp, current.timestamp) {
        (Some(candidate_ts), Some(current_ts)) => candidate_ts > current_ts,
        _ => false,
    }
}

/// Value shown in the "previous" column: the pre-change snapshot, else the
/// confirmed appointment.
pub fn resolve_previous<'a>(record: &'a NotificationRecord, field: &str) -> Option<&'a Value> {
    record
        .previous_details
        .as_ref()
        .and_then(|previous| previous.get(field))
        .or_else(|| confirmed(record, field))
}

/// Value shown in the "current" column: the proposed change, else the
/// confirmed appointment.
pub fn resolve_current<'a>(record: &'a NotificationRecord, field: &str) -> Option<&'a Value> {
    record
        .changes
        .get(field)
        .and_then(|change| change.new.as_ref())
        .filter(|value| !value.is_null())
        .or_else(|| confirmed(record, field))
}

fn confirmed<'a>(record: &'a NotificationRecord, field: &str) -> Option<&'a Value> {
    record
        .appointment_details
        .as_ref()
        .and_then(|details| details.get(field))
}

/// Before/after rows for the detail view. `None` without an appointment
/// snapshot to diff against.
pub fn build_diff(record: &NotificationRecord) -> Option<Vec<DiffRow>> {
    let details = record.appointment_details.as_ref()?;

    let rows = vec![
        fixed_row("Client", details, "client"),
        fixed_row("Artist", details, "artist"),
        diff_row(
            "Service",
            service_label(resolve_previous(record, "service")),
            service_label(resolve_current(record, "service")),
        ),
        diff_row(
            "Price",
            format_price(resolve_previous(record, "price")),
            format_price(resolve_current(record, "price")),
        ),
        diff_row(
            "Date",
            format_date(resolve_previous(record, "date")),
            format_date(resolve_current(record, "date")),
        ),
        diff_row(
            "Time",
            format_time_range(
                resolve_previous(record, "time"),
                resolve_previous(record, "end_time"),
            ),
            format_time_range(
                resolve_current(record, "time"),
                resolve_current(record, "end_time"),
            ),
        ),
        diff_row(
            "Notes",
            display_value(resolve_previous(record, "notes")),
            display_value(resolve_current(record, "notes")),
        ),
    ];

    Some(rows)
}

fn fixed_row(label: &str, details: &AppointmentSnapshot, field: &str) -> DiffRow {
    let value = display_value(details.get(field));
    DiffRow {
        label: label.to_string(),
        previous: value.clone(),
        current: value,
        changed: false,
    }
}

fn diff_row(label: &str, previous: String, current: String) -> DiffRow {
    DiffRow {
        label: label.to_string(),
        changed: previous != current,
        previous,
        current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> NotificationRecord {
        serde_json::from_value(value).unwrap()
    }

    fn row<'a>(rows: &'a [DiffRow], label: &str) -> &'a DiffRow {
        rows.iter().find(|row| row.label == label).expect("missing row")
    }

    #[test]
    fn empty_feed_stays_empty() {
        assert!(deduplicate(Vec::new()).is_empty());
    }

    #[test]
    fn pending_beats_newer_approved() {
        let records = vec![
            record(json!({
                "id": 1, "appointment": { "id": 7 }, "action": "updated",
                "status": "approved", "timestamp": "2025-03-02T10:00:00Z"
            })),
            record(json!({
                "id": 2, "appointment": { "id": 7 }, "action": "updated",
                "status": "pending", "timestamp": "2025-03-01T10:00:00Z"
            })),
        ];
        let deduped = deduplicate(records.clone());
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 2);

        let reversed = deduplicate(records.into_iter().rev().collect());
        assert_eq!(reversed[0].id, 2);
    }

    #[test]
    fn latest_wins_without_pending() {
        let deduped = deduplicate(vec![
            record(json!({
                "id": 1, "appointment": { "id": 7 }, "action": "created",
                "status": "approved", "timestamp": "2025-03-01T10:00:00Z"
            })),
            record(json!({
                "id": 2, "appointment": { "id": 7 }, "action": "updated",
                "status": "approved", "timestamp": "2025-03-04T10:00:00Z"
            })),
            record(json!({
                "id": 3, "appointment": { "id": 7 }, "action": "updated",
                "status": "denied", "timestamp": "2025-03-03T10:00:00Z"
            })),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 2);
    }

    #[test]
    fn latest_wins_with_offsetless_timestamps() {
        let deduped = deduplicate(vec![
            record(json!({
                "id": 1, "appointment": { "id": 7 }, "action": "created",
                "status": "approved", "timestamp": "2025-03-01T10:00:00"
            })),
            record(json!({
                "id": 2, "appointment": { "id": 7 }, "action": "updated",
                "status": "approved", "timestamp": "2025-03-04T10:00:00"
            })),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 2);
    }

    #[test]
    fn appointment_without_id_stands_alone() {
        let deduped = deduplicate(vec![
            record(json!({
                "id": 1, "appointment": { "id": null }, "action": "created",
                "status": "pending", "timestamp": "2025-03-01T10:00:00Z"
            })),
            record(json!({
                "id": 2, "appointment": {}, "action": "created",
                "status": "pending", "timestamp": "2025-03-02T10:00:00Z"
            })),
        ]);
        let ids: Vec<i64> = deduped.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn later_pending_replaces_earlier_pending() {
        let deduped = deduplicate(vec![
            record(json!({
                "id": 1, "appointment": { "id": 7 }, "action": "updated",
                "status": "pending", "timestamp": "2025-03-05T10:00:00Z"
            })),
            record(json!({
                "id": 2, "appointment": { "id": 7 }, "action": "updated",
                "status": "pending", "timestamp": "2025-03-01T10:00:00Z"
            })),
        ]);
        assert_eq!(deduped[0].id, 1);
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let deduped = deduplicate(vec![
            record(json!({ "id": 10, "appointment": { "id": 2 }, "action": "created", "status": "approved" })),
            record(json!({ "id": 11, "action": "no_show", "status": "approved" })),
            record(json!({ "id": 12, "appointment": { "id": 1 }, "action": "created", "status": "approved" })),
            record(json!({ "id": 13, "appointment": { "id": 2 }, "action": "updated", "status": "pending" })),
        ]);
        let ids: Vec<i64> = deduped.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![13, 11, 12]);
    }

    #[test]
    fn standalone_ids_do_not_collide_with_appointment_ids() {
        let deduped = deduplicate(vec![
            record(json!({ "id": 5, "action": "no_show", "status": "approved" })),
            record(json!({ "id": 6, "appointment": { "id": 5 }, "action": "created", "status": "approved" })),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn price_change_is_flagged() {
        let rows = build_diff(&record(json!({
            "id": 1, "appointment": { "id": 7 }, "action": "updated", "status": "pending",
            "appointment_details": { "client": "Ana Ruiz", "artist": "Rae", "price": 100 },
            "previous_details": { "price": 100 },
            "changes": { "price": { "new": 150 } }
        })))
        .unwrap();

        assert_eq!(
            row(&rows, "Price"),
            &DiffRow {
                label: "Price".into(),
                previous: "$100".into(),
                current: "$150".into(),
                changed: true,
            }
        );
        assert!(!row(&rows, "Client").changed);
        assert_eq!(row(&rows, "Artist").current, "Rae");
    }

    #[test]
    fn untouched_fields_fall_back_to_confirmed_values() {
        let rows = build_diff(&record(json!({
            "id": 1, "action": "updated", "status": "pending",
            "appointment_details": {
                "service": "service_1", "date": "2025-03-07", "notes": "left forearm"
            }
        })))
        .unwrap();

        let service = row(&rows, "Service");
        assert_eq!(service.previous, "Service 1");
        assert_eq!(service.current, "Service 1");
        assert!(!service.changed);
        assert_eq!(row(&rows, "Date").current, "3/7/2025");
        assert!(!row(&rows, "Notes").changed);
    }

    #[test]
    fn time_sides_resolve_independently() {
        let rows = build_diff(&record(json!({
            "id": 1, "action": "updated", "status": "pending",
            "appointment_details": { "time": "10:00:00", "end_time": "11:00:00" },
            "previous_details": { "time": "10:00:00", "end_time": "11:00:00" },
            "changes": { "time": { "new": "13:00:00" } }
        })))
        .unwrap();

        let time = row(&rows, "Time");
        assert_eq!(time.previous, "10:00 AM - 11:00 AM");
        assert_eq!(time.current, "1:00 PM - 11:00 AM");
        assert!(time.changed);
    }

    #[test]
    fn rows_follow_fixed_order() {
        let rows = build_diff(&record(json!({
            "id": 1, "action": "created", "status": "approved", "appointment_details": {}
        })))
        .unwrap();
        let labels: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Client", "Artist", "Service", "Price", "Date", "Time", "Notes"]
        );
    }

    #[test]
    fn changes_without_snapshot_yield_no_diff() {
        let diff = build_diff(&record(json!({
            "id": 1, "action": "updated", "status": "pending",
            "changes": { "price": { "new": 150 } }
        })));
        assert!(diff.is_none());
    }
}
