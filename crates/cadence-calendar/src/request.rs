//! Event payload construction.
//!
//! Every insert and update body is built here. A body starts as a copy of the
//! event last fetched from the API (when there is one) and only the fields the
//! draft sets are overwritten, so unrelated fields (description, reminders,
//! conference data, ...) survive the round trip.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use cadence_core::Environment;

use crate::types::{format_timestamp, Attendee, EventBody, EventDraft, EventSnapshot};

/// Build an event body against the current clock.
pub fn build_event_body(
    draft: &EventDraft,
    prior: Option<&EventSnapshot>,
    environment: Environment,
) -> EventBody {
    build_event_body_at(draft, prior, environment, Utc::now())
}

/// Build an event body, treating `now` as the current time.
///
/// Attendees are written only when the draft carries a list and its start is
/// absent or strictly after `now`. Outside production and test the list is
/// replaced with an empty one so a developer run never emails real people.
/// Guests can never see each other or invite others.
pub fn build_event_body_at(
    draft: &EventDraft,
    prior: Option<&EventSnapshot>,
    environment: Environment,
    now: DateTime<Utc>,
) -> EventBody {
    let mut body = prior
        .map(|snapshot| EventBody::from(snapshot.as_map().clone()))
        .unwrap_or_default();

    if let Some(start) = draft.start {
        body.insert("start", json!({ "dateTime": format_timestamp(start) }));
    }
    if let Some(end) = draft.end {
        body.insert("end", json!({ "dateTime": format_timestamp(end) }));
    }
    if let Some(summary) = &draft.summary {
        body.insert("summary", Value::String(summary.clone()));
    }
    if let Some(status) = draft.status {
        body.insert("status", Value::String(status.as_str().to_string()));
    }

    if let Some(attendees) = attendees_to_write(draft, now) {
        let attendees = if environment.delivers_invitations() {
            attendees.iter().map(Attendee::to_json).collect()
        } else {
            tracing::debug!(
                %environment,
                suppressed = attendees.len(),
                "Dropping attendees outside production/test"
            );
            Vec::new()
        };
        body.insert("attendees", Value::Array(attendees));
    }

    body.insert("guestsCanSeeOtherGuests", Value::Bool(false));
    body.insert("guestsCanInviteOthers", Value::Bool(false));

    body
}

fn attendees_to_write(draft: &EventDraft, now: DateTime<Utc>) -> Option<&[Attendee]> {
    let starts_in_future = draft.start.map_or(true, |start| start > now);
    if starts_in_future {
        draft.attendees.as_deref()
    } else {
        None
    }
}
