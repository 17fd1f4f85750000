//! Notification gateway
//!
//! Reminders are handed to an external gateway one attendee at a time.
//! With no gateway configured, reminders are only written to the log.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use events_common::{Attendee, Event};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// A single reminder for one attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub event_id: String,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
    pub recipient_name: String,
    pub recipient_email: String,
}

impl Reminder {
    pub fn for_attendee(event: &Event, attendee: &Attendee) -> Self {
        Self {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            event_date: event.date,
            location: event.location.clone(),
            recipient_name: attendee.name.clone(),
            recipient_email: attendee.email.clone(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one reminder. An error means this recipient was not notified.
    async fn send(&self, reminder: &Reminder) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// POSTs each reminder as JSON to a webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build notification client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, reminder: &Reminder) -> Result<()> {
        self.client
            .post(&self.url)
            .json(reminder)
            .send()
            .await
            .with_context(|| format!("Gateway unreachable at {}", self.url))?
            .error_for_status()
            .context("Gateway rejected reminder")?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Writes reminders to the log; used when no gateway is configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, reminder: &Reminder) -> Result<()> {
        info!(
            "[Notify] Reminder for '{}' on {} -> {} <{}>",
            reminder.event_name,
            reminder.event_date.format("%Y-%m-%d"),
            reminder.recipient_name,
            reminder.recipient_email
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn reminder() -> Reminder {
        Reminder {
            event_id: "e1".into(),
            event_name: "Launch".into(),
            event_date: "2025-01-01T00:00:00Z".parse().unwrap(),
            location: Some("Hall A".into()),
            recipient_name: "Ada".into(),
            recipient_email: "ada@example.com".into(),
        }
    }

    async fn spawn_gateway(status: StatusCode) -> (String, Arc<Mutex<Vec<Reminder>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/notify",
                post(
                    move |State(seen): State<Arc<Mutex<Vec<Reminder>>>>,
                          Json(r): Json<Reminder>| async move {
                        seen.lock().await.push(r);
                        status
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/notify", addr), received)
    }

    #[tokio::test]
    async fn test_webhook_delivers_json() {
        let (url, received) = spawn_gateway(StatusCode::OK).await;
        let notifier = WebhookNotifier::new(url, Duration::from_secs(5)).unwrap();

        notifier.send(&reminder()).await.unwrap();

        let seen = received.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], reminder());
    }

    #[tokio::test]
    async fn test_webhook_error_status_is_failure() {
        let (url, _) = spawn_gateway(StatusCode::SERVICE_UNAVAILABLE).await;
        let notifier = WebhookNotifier::new(url, Duration::from_secs(5)).unwrap();

        tokio_test::assert_err!(notifier.send(&reminder()).await);
    }

    #[tokio::test]
    async fn test_webhook_unreachable_is_failure() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier =
            WebhookNotifier::new(format!("http://{}/notify", addr), Duration::from_secs(2))
                .unwrap();
        tokio_test::assert_err!(notifier.send(&reminder()).await);
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        tokio_test::assert_ok!(LogNotifier.send(&reminder()).await);
        assert_eq!(LogNotifier.name(), "log");
    }
}
