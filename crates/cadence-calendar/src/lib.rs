//! Google Calendar adapter for Cadence.
//!
//! Creates calendars and events, manages attendee lists, and watches every
//! remote call for credential failures.

pub mod attendees;
pub mod client;
pub mod credentials;
pub mod error;
pub mod failure;
pub mod notify;
pub mod request;
pub mod service;
pub mod types;

pub use attendees::{add_to_attendees, cancel_attendance, remove_from_attendees};
pub use client::CalendarClient;
pub use credentials::{CredentialProvider, StoredCredentials, GOOGLE_SERVICE};
pub use error::CalendarError;
pub use failure::{AuthFailure, FailureHandler, OperatorNotifier, TokenInvalidator};
pub use notify::{notifier_from_config, LogNotifier, WebhookNotifier};
pub use request::{build_event_body, build_event_body_at};
pub use service::CalendarService;
pub use types::{
    Attendee, Calendar, CreatedEvent, EventBody, EventDraft, EventIdentity, EventSnapshot,
    EventStatus, NewCalendar, ResponseStatus,
};
