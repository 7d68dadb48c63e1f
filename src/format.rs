//! Display formatting shared by the diff table and the panel.
//!
//! Every formatter falls back to the raw value when it cannot make sense of
//! its input, so a malformed record still renders.

use crate::models::{Action, EmployeeRef, Status};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde_json::Value;

const SERVICE_LABELS: &[(&str, &str)] = &[
    ("service_1", "Service 1"),
    ("service_2", "Service 2"),
    ("service_3", "Service 3"),
];

/// Plain text for a JSON value: strings unquoted, `null`/absent empty.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(map)) => {
            person_name(map).unwrap_or_else(|| Value::Object(map.clone()).to_string())
        }
        Some(other) => other.to_string(),
    }
}

fn person_name(map: &serde_json::Map<String, Value>) -> Option<String> {
    if let Some(Value::String(full)) = map.get("full_name") {
        return Some(full.clone());
    }
    let first = map.get("first_name").and_then(Value::as_str).unwrap_or_default();
    let last = map.get("last_name").and_then(Value::as_str).unwrap_or_default();
    let joined = format!("{first} {last}").trim().to_string();
    if joined.is_empty() {
        map.get("name").and_then(Value::as_str).map(str::to_string)
    } else {
        Some(joined)
    }
}

pub fn service_label(value: Option<&Value>) -> String {
    let raw = display_value(value);
    SERVICE_LABELS
        .iter()
        .find(|(code, _)| *code == raw)
        .map(|(_, label)| label.to_string())
        .unwrap_or(raw)
}

pub fn format_price(value: Option<&Value>) -> String {
    let raw = display_value(value);
    if raw.is_empty() {
        raw
    } else {
        format!("${raw}")
    }
}

/// `2025-03-07` (or anything starting with it) to `3/7/2025`.
pub fn format_date(value: Option<&Value>) -> String {
    let raw = display_value(value);
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%-m/%-d/%Y").to_string())
        .unwrap_or(raw)
}

/// `13:05:00` or `13:05` to `1:05 PM`.
pub fn format_time(value: Option<&Value>) -> String {
    let raw = display_value(value);
    let mut parts = raw.split(':');
    let hours = parts.next().and_then(|part| part.trim().parse::<u32>().ok());
    let minutes = parts.next().and_then(|part| part.trim().parse::<u32>().ok());
    match (hours, minutes) {
        (Some(hours), Some(minutes)) => {
            let period = if hours >= 12 { "PM" } else { "AM" };
            let display_hours = match hours % 12 {
                0 => 12,
                other => other,
            };
            format!("{display_hours}:{minutes:02} {period}")
        }
        _ => raw,
    }
}

pub fn format_time_range(start: Option<&Value>, end: Option<&Value>) -> String {
    let start = format_time(start);
    let end = format_time(end);
    match (start.is_empty(), end.is_empty()) {
        (_, true) => start,
        (true, false) => end,
        (false, false) => format!("{start} - {end}"),
    }
}

pub fn employee_name(employee: Option<&EmployeeRef>) -> String {
    match employee {
        Some(EmployeeRef::Inline {
            id,
            full_name,
            username,
        }) => full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| username.as_deref().filter(|name| !name.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| match id {
                Some(id) => format!("Employee #{id}"),
                None => "Employee #".to_string(),
            }),
        Some(EmployeeRef::Id(id)) => format!("Employee #{id}"),
        Some(EmployeeRef::Other(raw)) => format!("Employee #{}", display_value(Some(raw))),
        None => "Employee #".to_string(),
    }
}

pub fn action_label(action: &Action) -> String {
    match action {
        Action::Created => "Created Appointment".to_string(),
        Action::Updated => "Updated Appointment".to_string(),
        Action::Canceled => "Canceled Appointment".to_string(),
        Action::NoShow => "No Show".to_string(),
        Action::Other(raw) => raw.clone(),
    }
}

pub fn status_badge(status: &Status) -> &'static str {
    match status {
        Status::Pending => "warning",
        Status::Approved => "success",
        Status::Denied => "error",
        Status::Other(_) => "default",
    }
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    format_timestamp_in(timestamp, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(timestamp: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .map(|ts| {
            ts.with_timezone(tz)
                .format("%-m/%-d/%Y, %-I:%M:%S %p")
                .to_string()
        })
        .unwrap_or_default()
}
