//! Attendee list edits.
//!
//! Each operator captures an email and returns the list transformation that
//! `CalendarService::update_attendees_on_event` applies to the fetched event.
//! Emails are compared by exact string equality.

use chrono::{DateTime, Utc};

use cadence_core::Environment;

use crate::error::CalendarError;
use crate::request::build_event_body_at;
use crate::types::{Attendee, EventBody, EventDraft, EventSnapshot, ResponseStatus};

/// Drop every attendee with this email, keeping the order of the rest.
pub fn remove_from_attendees(
    email: impl Into<String>,
) -> impl Fn(Vec<Attendee>) -> Vec<Attendee> + Send + Sync + 'static {
    let email = email.into();
    move |attendees| {
        attendees
            .into_iter()
            .filter(|attendee| attendee.email != email)
            .collect()
    }
}

/// Append an attendee. Does not check for an existing entry.
pub fn add_to_attendees(
    email: impl Into<String>,
) -> impl Fn(Vec<Attendee>) -> Vec<Attendee> + Send + Sync + 'static {
    let email = email.into();
    move |mut attendees| {
        attendees.push(Attendee::new(email.clone()));
        attendees
    }
}

/// Mark the attendee with this email as declined.
pub fn cancel_attendance(
    email: impl Into<String>,
) -> impl Fn(Vec<Attendee>) -> Vec<Attendee> + Send + Sync + 'static {
    let email = email.into();
    move |attendees| {
        attendees
            .into_iter()
            .map(|mut attendee| {
                if attendee.email == email {
                    attendee.response_status = Some(ResponseStatus::Declined);
                }
                attendee
            })
            .collect()
    }
}

/// Body for an attendee edit on `snapshot`.
///
/// The edit only applies when the event starts strictly after `now`; for
/// started, past, or all-day events the stored list goes back unchanged. An
/// event without attendees is edited as if it had an empty list.
pub fn attendee_update_body<F>(
    snapshot: &EventSnapshot,
    transform: F,
    environment: Environment,
    now: DateTime<Utc>,
) -> Result<EventBody, CalendarError>
where
    F: FnOnce(Vec<Attendee>) -> Vec<Attendee>,
{
    let current = snapshot.attendees()?;
    let starts_in_future = snapshot.start_time().is_some_and(|start| start > now);

    let attendees = if starts_in_future {
        Some(transform(current.unwrap_or_default()))
    } else {
        tracing::debug!(
            event_id = snapshot.id().unwrap_or_default(),
            "Event already started, keeping stored attendees"
        );
        current
    };

    let draft = EventDraft {
        attendees,
        ..EventDraft::default()
    };
    Ok(build_event_body_at(&draft, Some(snapshot), environment, now))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn list() -> Vec<Attendee> {
        serde_json::from_value(json!([
            {"email": "a@x.com", "responseStatus": "accepted", "displayName": "A"},
            {"email": "b@x.com", "responseStatus": "needsAction"},
            {"email": "a@x.com"},
            {"email": "c@x.com", "organizer": true}
        ]))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 15, 12, 0, 0).unwrap()
    }

    fn snapshot(start: &str) -> EventSnapshot {
        serde_json::from_value(json!({
            "id": "ev1",
            "summary": "Review",
            "start": {"dateTime": start},
            "attendees": [
                {"email": "a@x.com", "responseStatus": "accepted"},
                {"email": "b@x.com"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_remove_drops_all_matches_in_order() {
        let result = remove_from_attendees("a@x.com")(list());
        let emails: Vec<_> = result.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails, ["b@x.com", "c@x.com"]);
        assert_eq!(result[1].extra.get("organizer"), Some(&json!(true)));
    }

    #[test]
    fn test_remove_is_case_sensitive() {
        let result = remove_from_attendees("A@x.com")(list());
        assert_eq!(result, list());
    }

    #[test]
    fn test_add_appends_without_dedup() {
        let add = add_to_attendees("b@x.com");
        let once = add(list());
        assert_eq!(once.len(), 5);
        assert_eq!(once[4], Attendee::new("b@x.com"));
        assert_eq!(&once[..4], &list()[..]);

        let twice = add(once);
        assert_eq!(twice.len(), 6);
    }

    #[test]
    fn test_add_to_empty_list() {
        assert_eq!(add_to_attendees("z@x.com")(Vec::new()), vec![Attendee::new("z@x.com")]);
    }

    #[test]
    fn test_cancel_only_touches_matching_entries() {
        let original = list();
        let result = cancel_attendance("b@x.com")(original.clone());

        assert_eq!(result[1].response_status, Some(ResponseStatus::Declined));
        for i in [0, 2, 3] {
            assert_eq!(result[i], original[i]);
        }
    }

    #[test]
    fn test_cancel_unknown_email_is_noop() {
        assert_eq!(cancel_attendance("nobody@x.com")(list()), list());
        assert!(cancel_attendance("nobody@x.com")(Vec::new()).is_empty());
    }

    #[test]
    fn test_future_event_gets_transform() {
        let body = attendee_update_body(
            &snapshot("2030-02-01T10:00:00Z"),
            add_to_attendees("new@x.com"),
            Environment::Test,
            now(),
        )
        .unwrap();

        assert_eq!(
            body.get("attendees"),
            Some(&json!([
                {"email": "a@x.com", "responseStatus": "accepted"},
                {"email": "b@x.com"},
                {"email": "new@x.com"}
            ]))
        );
        assert_eq!(body.get("summary"), Some(&json!("Review")));
        assert_eq!(body.get("guestsCanInviteOthers"), Some(&json!(false)));
    }

    #[test]
    fn test_past_event_keeps_stored_attendees() {
        let past = snapshot("2030-01-01T10:00:00Z");
        let body = attendee_update_body(
            &past,
            remove_from_attendees("a@x.com"),
            Environment::Test,
            now(),
        )
        .unwrap();

        assert_eq!(body.get("attendees"), past.get("attendees"));
    }

    #[test]
    fn test_past_event_in_development_sends_empty_list() {
        let body = attendee_update_body(
            &snapshot("2030-01-01T10:00:00Z"),
            remove_from_attendees("a@x.com"),
            Environment::Development,
            now(),
        )
        .unwrap();

        assert_eq!(body.get("attendees"), Some(&json!([])));
        assert_eq!(body.get("summary"), Some(&json!("Review")));
    }

    #[test]
    fn test_event_starting_now_is_not_edited() {
        let body = attendee_update_body(
            &snapshot("2030-01-15T12:00:00Z"),
            |_| Vec::new(),
            Environment::Production,
            now(),
        )
        .unwrap();

        assert_eq!(body.get("attendees").and_then(|v| v.as_array()).map(Vec::len), Some(2));
    }

    #[test]
    fn test_future_event_without_attendees() {
        let snapshot: EventSnapshot = serde_json::from_value(json!({
            "id": "ev2",
            "start": {"dateTime": "2030-02-01T10:00:00Z"}
        }))
        .unwrap();

        let body =
            attendee_update_body(&snapshot, add_to_attendees("a@x.com"), Environment::Test, now())
                .unwrap();

        assert_eq!(body.get("attendees"), Some(&json!([{"email": "a@x.com"}])));
    }

    #[test]
    fn test_entries_without_email_do_not_block_edits() {
        let snapshot: EventSnapshot = serde_json::from_value(json!({
            "id": "ev3",
            "start": {"dateTime": "2030-02-01T10:00:00Z"},
            "attendees": [
                {"displayName": "Room 4", "resource": true},
                {"email": "a@x.com"}
            ]
        }))
        .unwrap();

        let body = attendee_update_body(
            &snapshot,
            remove_from_attendees("a@x.com"),
            Environment::Test,
            now(),
        )
        .unwrap();

        assert_eq!(
            body.get("attendees"),
            Some(&json!([{"displayName": "Room 4", "resource": true}]))
        );
    }

    #[test]
    fn test_future_event_in_development_sends_empty_list() {
        let body = attendee_update_body(
            &snapshot("2030-02-01T10:00:00Z"),
            add_to_attendees("new@x.com"),
            Environment::Development,
            now(),
        )
        .unwrap();

        assert_eq!(body.get("attendees"), Some(&json!([])));
    }
}
