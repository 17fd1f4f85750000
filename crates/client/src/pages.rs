//! Page controllers: each one owns its state machine and talks to the API

use crate::api::ApiClient;
use crate::routes::{Redirect, Route};
use crate::session::{Session, SessionStore};
use crate::state::{FormState, PageState};
use events_common::{
    date_only, Event, EventPatch, LoginRequest, NewAttendee, NewEvent, ReminderSummary,
    SignupRequest,
};
use tracing::{info, warn};

pub const MISSING_EVENT_FIELDS: &str = "Please fill in both name and date.";
pub const MISSING_AUTH_FIELDS: &str = "Please fill in all fields.";
pub const MISSING_ATTENDEE_FIELDS: &str = "Please provide a name and email.";

/// Fields of the create/update event form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: String,
}

impl EventForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.date.trim().is_empty() {
            return Err(MISSING_EVENT_FIELDS.to_string());
        }
        Ok(())
    }

    /// Pre-fill from a stored event, date cut to `YYYY-MM-DD`
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            date: date_only(&event.date),
            location: event.location.clone().unwrap_or_default(),
            description: event.description.clone().unwrap_or_default(),
        }
    }

    pub fn to_new_event(&self) -> NewEvent {
        NewEvent {
            name: Some(self.name.clone()),
            date: Some(self.date.clone()),
            location: Some(self.location.clone()),
            description: Some(self.description.clone()),
        }
    }

    /// The update page always submits the full form
    pub fn to_patch(&self) -> EventPatch {
        EventPatch {
            name: Some(self.name.clone()),
            date: Some(self.date.clone()),
            location: Some(self.location.clone()),
            description: Some(self.description.clone()),
        }
    }
}

/// Home page: all events, or the results of a search
#[derive(Debug, Default)]
pub struct EventListPage {
    pub query: String,
    pub state: PageState<Vec<Event>>,
}

impl EventListPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &ApiClient) {
        self.state = PageState::Loading;
        self.state = PageState::from_result(api.list_events().await);
    }

    pub async fn search(&mut self, api: &ApiClient, query: &str) {
        self.query = query.to_string();
        self.state = PageState::Loading;
        self.state = PageState::from_result(api.search_events(query).await);
    }
}

#[derive(Debug)]
pub struct EventDetailsPage {
    pub id: String,
    pub state: PageState<Event>,
    pub action: FormState,
}

impl EventDetailsPage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: PageState::Loading,
            action: FormState::Idle,
        }
    }

    pub async fn load(&mut self, api: &ApiClient) {
        self.state = PageState::Loading;
        self.state = PageState::from_result(api.get_event(&self.id).await);
    }

    /// Delete the event; on success the page navigates home
    pub async fn delete(&mut self, api: &ApiClient) -> Option<Redirect> {
        if !self.action.begin() {
            return None;
        }
        match api.delete_event(&self.id).await {
            Ok(confirmation) => {
                self.action.succeed(confirmation.message);
                Some(Redirect::now(Route::Home))
            }
            Err(e) => {
                self.action.fail(e.to_string());
                None
            }
        }
    }

    pub async fn add_attendee(&mut self, api: &ApiClient, name: &str, email: &str) {
        if !self.action.begin() {
            return;
        }
        if name.trim().is_empty() || email.trim().is_empty() {
            self.action.fail(MISSING_ATTENDEE_FIELDS);
            return;
        }

        let attendee = NewAttendee {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
        };
        match api.add_attendee(&self.id, &attendee).await {
            Ok(event) => {
                self.action.succeed(format!("{} added to the guest list", name.trim()));
                self.state = PageState::Ready(event);
            }
            Err(e) => {
                self.action.fail(e.to_string());
            }
        }
    }

    pub async fn send_reminder(&mut self, api: &ApiClient) -> Option<ReminderSummary> {
        if !self.action.begin() {
            return None;
        }
        match api.send_reminder(&self.id).await {
            Ok(summary) => {
                self.action.succeed(format!(
                    "Reminders sent: {} of {}",
                    summary.sent, summary.attempted
                ));
                Some(summary)
            }
            Err(e) => {
                self.action.fail(e.to_string());
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct CreateEventPage {
    pub form: EventForm,
    pub state: FormState,
}

impl CreateEventPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Option<Redirect> {
        if !self.state.begin() {
            return None;
        }
        if let Err(message) = self.form.validate() {
            self.state.fail(message);
            return None;
        }

        match api.create_event(&self.form.to_new_event()).await {
            Ok(event) => {
                info!("Created event {}", event.id);
                self.state.succeed("Event created successfully!");
                Some(Redirect::delayed(Route::Home))
            }
            Err(e) => {
                self.state.fail(e.to_string());
                None
            }
        }
    }
}

#[derive(Debug)]
pub struct UpdateEventPage {
    pub id: String,
    pub loaded: PageState<Event>,
    pub form: EventForm,
    pub state: FormState,
}

impl UpdateEventPage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            loaded: PageState::Loading,
            form: EventForm::default(),
            state: FormState::Idle,
        }
    }

    pub async fn load(&mut self, api: &ApiClient) {
        self.loaded = PageState::Loading;
        self.loaded = PageState::from_result(api.get_event(&self.id).await);
        if let Some(event) = self.loaded.ready() {
            self.form = EventForm::from_event(event);
        }
    }

    /// Overlay edits on the loaded event. Fields left `None` keep their
    /// stored value; an untouched date keeps its full timestamp rather than
    /// the day shown in the form.
    pub fn apply(&mut self, edits: EventPatch) {
        let Some(event) = self.loaded.ready() else {
            return;
        };
        self.form = EventForm {
            name: edits.name.unwrap_or_else(|| event.name.clone()),
            date: edits.date.unwrap_or_else(|| event.date.to_rfc3339()),
            location: edits
                .location
                .unwrap_or_else(|| event.location.clone().unwrap_or_default()),
            description: edits
                .description
                .unwrap_or_else(|| event.description.clone().unwrap_or_default()),
        };
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Option<Redirect> {
        if !self.state.begin() {
            return None;
        }
        if let Err(message) = self.form.validate() {
            self.state.fail(message);
            return None;
        }

        match api.update_event(&self.id, &self.form.to_patch()).await {
            Ok(event) => {
                self.loaded = PageState::Ready(event);
                self.state.succeed("Event updated successfully!");
                Some(Redirect::delayed(Route::Home))
            }
            Err(e) => {
                self.state.fail(e.to_string());
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct LoginPage {
    pub email: String,
    pub password: String,
    pub state: FormState,
}

impl LoginPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log in, cache the session, and point `api` at the new token
    pub async fn submit(
        &mut self,
        api: &mut ApiClient,
        store: &SessionStore,
    ) -> Option<Redirect> {
        if !self.state.begin() {
            return None;
        }
        if self.email.trim().is_empty() || self.password.is_empty() {
            self.state.fail(MISSING_AUTH_FIELDS);
            return None;
        }

        let req = LoginRequest {
            email: Some(self.email.clone()),
            password: Some(self.password.clone()),
        };
        match api.login(&req).await {
            Ok(auth) => {
                let session = Session {
                    token: auth.token,
                    user: auth.user,
                };
                finish_auth(&mut self.state, api, store, session, "Login successful!")
            }
            Err(e) => {
                self.state.fail(e.to_string());
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SignupPage {
    pub name: String,
    pub email: String,
    pub password: String,
    pub state: FormState,
}

impl SignupPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(
        &mut self,
        api: &mut ApiClient,
        store: &SessionStore,
    ) -> Option<Redirect> {
        if !self.state.begin() {
            return None;
        }
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty()
        {
            self.state.fail(MISSING_AUTH_FIELDS);
            return None;
        }

        let req = SignupRequest {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            password: Some(self.password.clone()),
        };
        match api.signup(&req).await {
            Ok(auth) => {
                let session = Session {
                    token: auth.token,
                    user: auth.user,
                };
                finish_auth(&mut self.state, api, store, session, "Signup successful!")
            }
            Err(e) => {
                self.state.fail(e.to_string());
                None
            }
        }
    }
}

fn finish_auth(
    state: &mut FormState,
    api: &mut ApiClient,
    store: &SessionStore,
    session: Session,
    message: &str,
) -> Option<Redirect> {
    if let Err(e) = store.save(&session) {
        state.fail(e.to_string());
        return None;
    }
    api.set_token(Some(session.token));
    state.succeed(message);
    Some(Redirect::now(Route::Home))
}

/// Drop the cached session and return to the login page
pub fn logout(api: &mut ApiClient, store: &SessionStore) -> Redirect {
    if let Err(e) = store.clear() {
        warn!("Failed to clear session cache: {}", e);
    }
    api.set_token(None);
    Redirect::now(Route::Login)
}
