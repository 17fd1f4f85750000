//! Event Service
//!
//! Validates and executes event operations against the `events` document
//! collection. Concurrent writes to one event are last-write-wins.

pub mod handlers;

use crate::core::error::{Error, Result};
use crate::core::store::{Document, JsonCollection};
use crate::notify::{Notifier, Reminder};
use chrono::{DateTime, Utc};
use events_common::{
    looks_like_email, normalize_email, parse_event_date, Attendee, DateError, DeleteConfirmation,
    Event, EventPatch, NewAttendee, NewEvent, ReminderSummary,
};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

impl Document for Event {
    const COLLECTION: &'static str = "events";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub struct EventService {
    events: JsonCollection<Event>,
    notifier: Arc<dyn Notifier>,
}

impl EventService {
    pub async fn new(events_dir: &Path, notifier: Arc<dyn Notifier>) -> anyhow::Result<Self> {
        let events = JsonCollection::open(events_dir).await?;
        info!("[Events] Using '{}' notifier", notifier.name());
        Ok(Self { events, notifier })
    }

    /// All events in storage order
    pub async fn list(&self) -> Vec<Event> {
        self.events.all().await
    }

    /// Case-insensitive substring match on name, location and description.
    /// A blank query matches everything.
    pub async fn search(&self, query: &str) -> Vec<Event> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list().await;
        }

        let matches = |text: Option<&str>| text.is_some_and(|t| t.to_lowercase().contains(&needle));
        self.events
            .find(|e| {
                matches(Some(&e.name))
                    || matches(e.location.as_deref())
                    || matches(e.description.as_deref())
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Event> {
        self.events.get(id).await.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, input: NewEvent) -> Result<Event> {
        let name = input.name.as_deref().and_then(non_blank);
        let date = input.date.as_deref().and_then(non_blank);
        let (Some(name), Some(date)) = (name, date) else {
            return Err(Error::Validation(
                "Event name and date are required".to_string(),
            ));
        };

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4().to_string(),
            name,
            date: parse_date(&date)?,
            location: input.location.as_deref().and_then(non_blank),
            description: input.description.as_deref().and_then(non_blank),
            attendees: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let event = self.events.insert(event).await?;
        info!("[Events] Created {} ({})", event.name, event.id);
        Ok(event)
    }

    /// Apply only the supplied fields. An empty `location`/`description`
    /// clears it; an empty `name` or bad `date` is rejected. A patch with no
    /// fields returns the stored event without rewriting it.
    pub async fn update(&self, id: &str, patch: EventPatch) -> Result<Event> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let name = match patch.name.as_deref() {
            Some(raw) => Some(
                non_blank(raw)
                    .ok_or_else(|| Error::Validation("Event name cannot be empty".to_string()))?,
            ),
            None => None,
        };
        let date = patch.date.as_deref().map(parse_date).transpose()?;

        let updated = self
            .events
            .update(id, |event: &mut Event| {
                if let Some(name) = name {
                    event.name = name;
                }
                if let Some(date) = date {
                    event.date = date;
                }
                if let Some(location) = patch.location.as_deref() {
                    event.location = non_blank(location);
                }
                if let Some(description) = patch.description.as_deref() {
                    event.description = non_blank(description);
                }
                event.updated_at = Utc::now();
                Ok::<_, Error>(())
            })
            .await?
            .ok_or_else(|| not_found(id))?;

        info!("[Events] Updated {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteConfirmation> {
        let removed = self.events.remove(id).await?.ok_or_else(|| not_found(id))?;
        info!("[Events] Deleted {} ({})", removed.name, removed.id);

        Ok(DeleteConfirmation {
            message: "Event deleted successfully".to_string(),
            id: removed.id,
        })
    }

    pub async fn add_attendee(&self, event_id: &str, input: NewAttendee) -> Result<Event> {
        let name = input
            .name
            .as_deref()
            .and_then(non_blank)
            .ok_or_else(|| Error::Validation("Attendee name is required".to_string()))?;
        let email = input
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::Validation("Attendee email is required".to_string()))?;
        if !looks_like_email(&email) {
            return Err(Error::Validation(format!("Invalid attendee email: {}", email)));
        }

        let updated = self
            .events
            .update(event_id, |event: &mut Event| {
                if event.attendees.iter().any(|a| a.email == email) {
                    return Err(Error::Conflict(format!(
                        "{} is already attending this event",
                        email
                    )));
                }
                let now = Utc::now();
                event.attendees.push(Attendee {
                    name,
                    email: email.clone(),
                    added_at: now,
                });
                event.updated_at = now;
                Ok(())
            })
            .await?
            .ok_or_else(|| not_found(event_id))?;

        info!("[Events] Added attendee {} to {}", email, event_id);
        Ok(updated)
    }

    /// Hand one reminder per attendee to the gateway and report the outcome.
    ///
    /// Fails with a dependency error only when there was someone to notify
    /// and every dispatch failed.
    pub async fn send_reminder(&self, event_id: &str) -> Result<ReminderSummary> {
        let event = self.get(event_id).await?;

        let reminders: Vec<Reminder> = event
            .attendees
            .iter()
            .map(|a| Reminder::for_attendee(&event, a))
            .collect();
        let results = join_all(reminders.iter().map(|r| self.notifier.send(r))).await;

        let mut failures = Vec::new();
        for (reminder, result) in reminders.iter().zip(results) {
            if let Err(e) = result {
                warn!(
                    "[Events] Reminder to {} for {} failed: {:#}",
                    reminder.recipient_email, event_id, e
                );
                failures.push(reminder.recipient_email.clone());
            }
        }

        let summary = ReminderSummary {
            event_id: event.id,
            attempted: reminders.len(),
            sent: reminders.len() - failures.len(),
            failed: failures.len(),
            failures,
        };

        if summary.attempted > 0 && summary.sent == 0 {
            return Err(Error::Dependency(format!(
                "Notification gateway failed for all {} attendees",
                summary.attempted
            )));
        }

        info!(
            "[Events] Reminders for {}: {}/{} sent",
            event_id, summary.sent, summary.attempted
        );
        Ok(summary)
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("Event {} not found", id))
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    parse_event_date(raw).map_err(|e| match e {
        DateError::Empty => Error::Validation("Event date cannot be empty".to_string()),
        DateError::Malformed(_) => Error::Validation(e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Fails for addresses on `bad`, counts every call
    struct FlakyNotifier {
        bad: Vec<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn send(&self, reminder: &Reminder) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.bad.contains(&reminder.recipient_email) {
                anyhow::bail!("mailbox unavailable");
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    async fn service(dir: &TempDir) -> EventService {
        EventService::new(dir.path(), Arc::new(LogNotifier))
            .await
            .unwrap()
    }

    fn new_event(name: &str, date: &str) -> NewEvent {
        NewEvent {
            name: Some(name.to_string()),
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    fn attendee(name: &str, email: &str) -> NewAttendee {
        NewAttendee {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_echoes_input_and_assigns_id() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;

        let event = events
            .create(NewEvent {
                name: Some("Demo".into()),
                date: Some("2025-01-01".into()),
                location: Some("Hall A".into()),
                description: Some("  ".into()),
            })
            .await
            .unwrap();

        assert!(!event.id.is_empty());
        assert_eq!(event.name, "Demo");
        assert_eq!(event.date.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(event.location.as_deref(), Some("Hall A"));
        assert_eq!(event.description, None);
        assert!(event.attendees.is_empty());
        assert_eq!(events.get(&event.id).await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_create_requires_name_and_date() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;

        for input in [
            NewEvent {
                date: Some("2025-01-01".into()),
                ..Default::default()
            },
            NewEvent {
                name: Some("Demo".into()),
                ..Default::default()
            },
            new_event("   ", "2025-01-01"),
            new_event("Demo", "not a date"),
        ] {
            let err = events.create(input).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "got {:?}", err);
        }

        assert!(events.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;

        let err = events.get(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_changes_only_supplied_fields() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;
        let mut input = new_event("Demo", "2025-01-01");
        input.location = Some("Hall A".into());
        input.description = Some("Kickoff".into());
        let created = events.create(input).await.unwrap();

        let updated = events
            .update(
                &created.id,
                EventPatch {
                    name: Some("Demo Day".into()),
                    location: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Demo Day");
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.location, None);
        assert_eq!(updated.description.as_deref(), Some("Kickoff"));
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(events.get(&created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_rejects_bad_fields_and_unknown_id() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;
        let created = events.create(new_event("Demo", "2025-01-01")).await.unwrap();

        let err = events
            .update(
                &created.id,
                EventPatch {
                    name: Some(" ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = events
            .update(
                &created.id,
                EventPatch {
                    date: Some("31/12/2025".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(events.get(&created.id).await.unwrap(), created);

        let err = events
            .update("missing", EventPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_patch_leaves_event_untouched() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;
        let created = events.create(new_event("Demo", "2025-01-01")).await.unwrap();

        let same = events
            .update(&created.id, EventPatch::default())
            .await
            .unwrap();
        assert_eq!(same, created);
        assert_eq!(same.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;
        let created = events.create(new_event("Demo", "2025-01-01")).await.unwrap();

        let confirmation = events.delete(&created.id).await.unwrap();
        assert_eq!(confirmation.id, created.id);

        assert!(matches!(
            events.get(&created.id).await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            events.delete(&created.id).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;
        let rust = events
            .create(new_event("RustConf Meetup", "2025-01-01"))
            .await
            .unwrap();
        let mut picnic = new_event("Picnic", "2025-02-01");
        picnic.location = Some("Rustic Park".into());
        let picnic = events.create(picnic).await.unwrap();
        events.create(new_event("Board game night", "2025-03-01")).await.unwrap();

        let hits = events.search("rust").await;
        assert_eq!(hits, vec![rust.clone(), picnic]);

        assert_eq!(events.search("MEETUP").await, vec![rust]);
        assert!(events.search("zzz-no-match").await.is_empty());
        assert_eq!(events.search("  ").await.len(), 3);
    }

    #[tokio::test]
    async fn test_list_survives_restart_in_order() {
        let dir = TempDir::new().unwrap();
        let ids: Vec<String> = {
            let events = service(&dir).await;
            let mut ids = Vec::new();
            for name in ["first", "second", "third"] {
                ids.push(events.create(new_event(name, "2025-01-01")).await.unwrap().id);
            }
            ids
        };

        let events = service(&dir).await;
        let listed: Vec<String> = events.list().await.into_iter().map(|e| e.id).collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_add_attendee() {
        let dir = TempDir::new().unwrap();
        let events = service(&dir).await;
        let created = events.create(new_event("Demo", "2025-01-01")).await.unwrap();

        let updated = events
            .add_attendee(&created.id, attendee("Ada", "Ada@Example.com"))
            .await
            .unwrap();
        assert_eq!(updated.attendees.len(), 1);
        assert_eq!(updated.attendees[0].email, "ada@example.com");

        let updated = events
            .add_attendee(&created.id, attendee("Grace", "grace@example.com"))
            .await
            .unwrap();
        let names: Vec<_> = updated.attendees.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Grace"]);

        let err = events
            .add_attendee(&created.id, attendee("Ada again", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let err = events
            .add_attendee(&created.id, attendee("Nobody", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = events
            .add_attendee("missing", attendee("Ada", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reminder_counts() {
        let dir = TempDir::new().unwrap();
        let notifier = Arc::new(FlakyNotifier {
            bad: vec!["grace@example.com".to_string()],
            calls: AtomicUsize::new(0),
        });
        let events = EventService::new(dir.path(), notifier.clone())
            .await
            .unwrap();
        let created = events.create(new_event("Demo", "2025-01-01")).await.unwrap();

        let summary = events.send_reminder(&created.id).await.unwrap();
        assert_eq!((summary.attempted, summary.sent, summary.failed), (0, 0, 0));

        events
            .add_attendee(&created.id, attendee("Ada", "ada@example.com"))
            .await
            .unwrap();
        events
            .add_attendee(&created.id, attendee("Grace", "grace@example.com"))
            .await
            .unwrap();

        let summary = events.send_reminder(&created.id).await.unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures, vec!["grace@example.com".to_string()]);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reminder_all_failed_is_dependency_error() {
        let dir = TempDir::new().unwrap();
        let notifier = Arc::new(FlakyNotifier {
            bad: vec!["ada@example.com".to_string()],
            calls: AtomicUsize::new(0),
        });
        let events = EventService::new(dir.path(), notifier).await.unwrap();
        let created = events.create(new_event("Demo", "2025-01-01")).await.unwrap();
        events
            .add_attendee(&created.id, attendee("Ada", "ada@example.com"))
            .await
            .unwrap();

        let err = events.send_reminder(&created.id).await.unwrap_err();
        assert!(matches!(err, Error::Dependency(_)));

        let err = events.send_reminder("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
