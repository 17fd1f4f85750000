#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use server::notify::{Notifier, Reminder};
use server::{AppState, ServerConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;

/// Records reminders; fails for every address listed in `fail_for`
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail_for: Vec<String>,
    pub sent: Mutex<Vec<Reminder>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, reminder: &Reminder) -> Result<()> {
        if self.fail_for.contains(&reminder.recipient_email) {
            anyhow::bail!("gateway down for {}", reminder.recipient_email);
        }
        self.sent.lock().await.push(reminder.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn test_config(dir: &TempDir) -> ServerConfig {
    let mut config = ServerConfig::with_base_dir(dir.path());
    config.bcrypt_cost = 4;
    config
}

pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default()).await
    }

    pub async fn with_notifier(notifier: RecordingNotifier) -> Self {
        let dir = TempDir::new().unwrap();
        let notifier = Arc::new(notifier);
        let state = AppState::with_notifier(test_config(&dir), notifier.clone())
            .await
            .unwrap();
        Self {
            dir,
            state,
            notifier,
        }
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None, None).await
    }
}

pub fn parse<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}
