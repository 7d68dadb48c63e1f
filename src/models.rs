use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One activity-feed entry as served by `GET recent-activity/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "appointment_ref")]
    pub appointment: Option<AppointmentRef>,
    #[serde(default)]
    pub employee: Option<EmployeeRef>,
    pub action: Action,
    pub status: Status,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub appointment_details: Option<AppointmentSnapshot>,
    #[serde(default)]
    pub previous_details: Option<AppointmentSnapshot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: BTreeMap<String, FieldChange>,
}

impl NotificationRecord {
    /// Only pending change requests get approve / decline. No-show entries
    /// are informational even while pending.
    pub fn is_reviewable(&self) -> bool {
        self.status == Status::Pending && self.action != Action::NoShow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRef {
    pub id: i64,
}

/// The backend embeds the employee for some serializers and sends a bare
/// primary key for others. Anything else is kept raw for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeeRef {
    Inline {
        #[serde(default)]
        id: Option<i64>,
        #[serde(default)]
        full_name: Option<String>,
        #[serde(default)]
        username: Option<String>,
    },
    Id(i64),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Created,
    Updated,
    Canceled,
    NoShow,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Canceled => "canceled",
            Action::NoShow => "no_show",
            Action::Other(raw) => raw,
        }
    }
}

impl From<String> for Action {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "created" => Action::Created,
            "updated" => Action::Updated,
            "canceled" => Action::Canceled,
            "no_show" => Action::NoShow,
            _ => Action::Other(raw),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Pending,
    Approved,
    Denied,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Denied => "denied",
            Status::Other(raw) => raw,
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Status::Pending,
            "approved" => Status::Approved,
            "denied" => Status::Denied,
            _ => Status::Other(raw),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

/// Appointment fields as captured by the backend. Values stay as raw JSON
/// since the serializers are not consistent about strings vs numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSnapshot {
    #[serde(default)]
    pub client: Option<Value>,
    #[serde(default)]
    pub artist: Option<Value>,
    #[serde(default)]
    pub service: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub time: Option<Value>,
    #[serde(default)]
    pub end_time: Option<Value>,
    #[serde(default)]
    pub notes: Option<Value>,
}

impl AppointmentSnapshot {
    /// Looks a field up by its wire name. JSON `null` reads as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        let value = match field {
            "client" => self.client.as_ref(),
            "artist" => self.artist.as_ref(),
            "service" => self.service.as_ref(),
            "price" => self.price.as_ref(),
            "date" => self.date.as_ref(),
            "time" => self.time.as_ref(),
            "end_time" => self.end_time.as_ref(),
            "notes" => self.notes.as_ref(),
            _ => None,
        };
        value.filter(|value| !value.is_null())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(default)]
    pub new: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    pub label: String,
    pub previous: String,
    pub current: String,
    pub changed: bool,
}

/// Backend user returned by `GET user/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CsrfResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: Option<String>,
}

/// A reconciled record plus the display strings the panel shows for it.
#[derive(Debug, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub record: NotificationRecord,
    pub employee_name: String,
    pub action_label: String,
    pub status_badge: &'static str,
    pub reviewable: bool,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationView>,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct NotificationDetail {
    #[serde(flatten)]
    pub view: NotificationView,
    pub diff: Option<Vec<DiffRow>>,
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    #[serde(default)]
    pub error: Option<String>,
}

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// RFC 3339 first; timestamps without an offset are read as local time.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|local| local.with_timezone(&Utc))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

/// `{"id": 7}` or a bare `7`. A missing or unusable id means the record
/// groups under its own id.
fn appointment_ref<'de, D>(deserializer: D) -> Result<Option<AppointmentRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let id = match raw {
        Some(Value::Object(fields)) => fields.get("id").and_then(id_value),
        Some(value) => id_value(&value),
        None => None,
    };
    Ok(id.map(|id| AppointmentRef { id }))
}

fn id_value(value: &Value) -> Option<i64> {
    match value {
        Value::String(text) => text.trim().parse().ok(),
        other => other.as_i64(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn employee_accepts_object_or_bare_id() {
        let inline: EmployeeRef =
            serde_json::from_value(json!({ "id": 4, "full_name": "Rae Vance" })).unwrap();
        assert_eq!(
            inline,
            EmployeeRef::Inline {
                id: Some(4),
                full_name: Some("Rae Vance".into()),
                username: None,
            }
        );

        let bare: EmployeeRef = serde_json::from_value(json!(9)).unwrap();
        assert_eq!(bare, EmployeeRef::Id(9));

        let text: EmployeeRef = serde_json::from_value(json!("4")).unwrap();
        assert_eq!(text, EmployeeRef::Other(json!("4")));
    }

    #[test]
    fn record_with_string_employee_still_parses() {
        let record: NotificationRecord = serde_json::from_value(json!({
            "id": 6, "employee": "4", "action": "updated", "status": "pending"
        }))
        .unwrap();
        assert_eq!(record.employee, Some(EmployeeRef::Other(json!("4"))));
    }

    #[test]
    fn appointment_without_id_groups_by_record() {
        for appointment in [json!({ "id": null }), json!({}), json!("x")] {
            let record: NotificationRecord = serde_json::from_value(json!({
                "id": 8, "appointment": appointment, "action": "created", "status": "pending"
            }))
            .unwrap();
            assert_eq!(record.appointment, None);
        }

        let record: NotificationRecord = serde_json::from_value(json!({
            "id": 8, "appointment": { "id": "15" }, "action": "created", "status": "pending"
        }))
        .unwrap();
        assert_eq!(record.appointment, Some(AppointmentRef { id: 15 }));
    }

    #[test]
    fn timestamps_without_offset_read_as_local_time() {
        let expected = NaiveDateTime::parse_from_str("2025-03-01T10:00:00", "%Y-%m-%dT%H:%M:%S")
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(parse_timestamp("2025-03-01T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 10:00:00.000"), Some(expected));
        assert!(parse_timestamp("2025-03-01T10:00:00.5").unwrap() > expected);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn record_tolerates_missing_and_malformed_fields() {
        let record: NotificationRecord = serde_json::from_value(json!({
            "id": 12,
            "appointment": 30,
            "action": "rescheduled",
            "status": "pending",
            "timestamp": "not a date",
            "changes": null
        }))
        .unwrap();

        assert_eq!(record.appointment, Some(AppointmentRef { id: 30 }));
        assert_eq!(record.action, Action::Other("rescheduled".into()));
        assert_eq!(record.timestamp, None);
        assert!(record.changes.is_empty());
        assert!(record.appointment_details.is_none());
    }

    #[test]
    fn record_parses_full_payload() {
        let record: NotificationRecord = serde_json::from_value(json!({
            "id": 1,
            "appointment": { "id": 5 },
            "employee": { "id": 2, "username": "jo" },
            "action": "updated",
            "status": "approved",
            "timestamp": "2025-03-01T14:30:00.123456Z",
            "appointment_details": { "price": 100, "notes": null },
            "changes": { "price": { "new": 150 } }
        }))
        .unwrap();

        assert_eq!(record.appointment, Some(AppointmentRef { id: 5 }));
        assert_eq!(record.status, Status::Approved);
        assert!(record.timestamp.is_some());
        let details = record.appointment_details.as_ref().unwrap();
        assert_eq!(details.get("price"), Some(&json!(100)));
        assert_eq!(details.get("notes"), None);
        assert_eq!(record.changes["price"].new, Some(json!(150)));
    }

    #[test]
    fn status_and_action_round_trip_as_strings() {
        assert_eq!(serde_json::to_value(Status::Denied).unwrap(), json!("denied"));
        assert_eq!(serde_json::to_value(Action::NoShow).unwrap(), json!("no_show"));
    }

    #[test]
    fn no_show_is_never_reviewable() {
        let mut record: NotificationRecord = serde_json::from_value(json!({
            "id": 3, "action": "no_show", "status": "pending"
        }))
        .unwrap();
        assert!(!record.is_reviewable());

        record.action = Action::Updated;
        assert!(record.is_reviewable());

        record.status = Status::Approved;
        assert!(!record.is_reviewable());
    }
}
