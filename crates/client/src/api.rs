//! Typed HTTP client for the Event Manager API

use crate::error::{fallback, ClientError, Result};
use events_common::{
    AuthResponse, DeleteConfirmation, ErrorBody, Event, EventPatch, LoginRequest, NewAttendee,
    NewEvent, ReminderSummary, SignupRequest, UserInfo,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub const DEFAULT_SERVER: &str = "http://localhost:5001";

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Url(format!("{} cannot be a base URL", base_url)));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode, turning failures into user-facing messages
    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder, fallback: &str) -> Result<T> {
        let transport = |source| ClientError::Transport {
            message: fallback.to_string(),
            source,
        };

        let response = req.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(transport);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .map(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let url = self.endpoint(&["api", "events"]);
        self.execute(self.request(Method::GET, url), fallback::FETCH_EVENTS)
            .await
    }

    pub async fn search_events(&self, query: &str) -> Result<Vec<Event>> {
        let mut url = self.endpoint(&["api", "events", "search"]);
        url.query_pairs_mut().append_pair("query", query);
        self.execute(self.request(Method::GET, url), fallback::SEARCH_EVENTS)
            .await
    }

    pub async fn get_event(&self, id: &str) -> Result<Event> {
        let url = self.endpoint(&["api", "events", id]);
        self.execute(self.request(Method::GET, url), fallback::FETCH_EVENT)
            .await
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        let url = self.endpoint(&["api", "events"]);
        self.execute(
            self.request(Method::POST, url).json(event),
            fallback::CREATE_EVENT,
        )
        .await
    }

    pub async fn update_event(&self, id: &str, patch: &EventPatch) -> Result<Event> {
        let url = self.endpoint(&["api", "events", id]);
        self.execute(
            self.request(Method::PUT, url).json(patch),
            fallback::UPDATE_EVENT,
        )
        .await
    }

    pub async fn delete_event(&self, id: &str) -> Result<DeleteConfirmation> {
        let url = self.endpoint(&["api", "events", id]);
        self.execute(self.request(Method::DELETE, url), fallback::DELETE_EVENT)
            .await
    }

    pub async fn add_attendee(&self, event_id: &str, attendee: &NewAttendee) -> Result<Event> {
        let url = self.endpoint(&["api", "events", "attendees", event_id]);
        self.execute(
            self.request(Method::POST, url).json(attendee),
            fallback::ADD_ATTENDEE,
        )
        .await
    }

    pub async fn send_reminder(&self, event_id: &str) -> Result<ReminderSummary> {
        let url = self.endpoint(&["api", "events", "reminder", event_id]);
        self.execute(self.request(Method::POST, url), fallback::SEND_REMINDER)
            .await
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<AuthResponse> {
        let url = self.endpoint(&["api", "auth", "signup"]);
        self.execute(self.request(Method::POST, url).json(req), fallback::SIGNUP)
            .await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        let url = self.endpoint(&["api", "auth", "login"]);
        self.execute(self.request(Method::POST, url).json(req), fallback::LOGIN)
            .await
    }

    pub async fn me(&self) -> Result<UserInfo> {
        let url = self.endpoint(&["api", "auth", "me"]);
        self.execute(self.request(Method::GET, url), fallback::PROFILE)
            .await
    }
}
