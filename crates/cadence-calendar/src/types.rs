//! Calendar API types and data structures.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CalendarError;

/// Handle to a remote event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventIdentity {
    pub calendar_id: String,
    pub calendar_event_id: String,
}

impl EventIdentity {
    pub fn new(calendar_id: impl Into<String>, calendar_event_id: impl Into<String>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            calendar_event_id: calendar_event_id.into(),
        }
    }
}

/// Attendee response status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    NeedsAction,
    Declined,
    Tentative,
    Accepted,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NeedsAction => "needsAction",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
            Self::Accepted => "accepted",
        }
    }
}

/// Event attendee. Fields this crate doesn't model (displayName, organizer,
/// self, ...) ride along in `extra` so a write never drops them.
///
/// Entries without an email (resources, some group members) keep an empty
/// `email` and are written back without one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<ResponseStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            response_status: None,
            extra: Map::new(),
        }
    }

    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.response_status = Some(status);
        self
    }

    /// JSON form as sent to the API.
    pub fn to_json(&self) -> Value {
        let mut object = self.extra.clone();
        if !self.email.is_empty() {
            object.insert("email".to_string(), Value::String(self.email.clone()));
        }
        if let Some(status) = self.response_status {
            object.insert(
                "responseStatus".to_string(),
                Value::String(status.as_str().to_string()),
            );
        }
        Value::Object(object)
    }
}

/// The only status a draft may set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Cancelled,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
        }
    }
}

/// Sparse set of event changes. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    /// Replaces the whole attendee list when written.
    pub attendees: Option<Vec<Attendee>>,
    pub status: Option<EventStatus>,
}

impl EventDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn attendees(mut self, attendees: Vec<Attendee>) -> Self {
        self.attendees = Some(attendees);
        self
    }

    pub fn cancelled(mut self) -> Self {
        self.status = Some(EventStatus::Cancelled);
        self
    }
}

/// An event exactly as the API returned it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct EventSnapshot(Map<String, Value>);

impl EventSnapshot {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// `start.dateTime`, if the event has a timed start that parses.
    /// All-day events (which only carry `start.date`) yield `None`.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.0.get("start")?.get("dateTime")?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The stored attendee list; `None` when the event has none.
    pub fn attendees(&self) -> Result<Option<Vec<Attendee>>, CalendarError> {
        match self.0.get("attendees") {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| CalendarError::InvalidEventData(format!("attendees: {}", e))),
        }
    }
}

impl From<Map<String, Value>> for EventSnapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Payload for an event insert or update.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct EventBody(Map<String, Value>);

impl EventBody {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }
}

impl From<Map<String, Value>> for EventBody {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Body for calendars.insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewCalendar {
    pub summary: String,
    pub description: String,
}

/// A calendar as returned by calendars.insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    pub description: Option<String>,
    pub time_zone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of creating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub calendar_event_id: String,
}

/// Timestamp in the API's `dateTime` form (UTC, millisecond precision).
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Google Calendar API error envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}
