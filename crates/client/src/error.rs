use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Client-side failures. `Display` is what the user sees: the server's
/// message verbatim when it sent one, otherwise a fixed fallback.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Session cache error: {0}")]
    Session(String),

    #[error("Invalid server URL: {0}")]
    Url(String),
}

impl ClientError {
    /// HTTP status for errors the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Url(err.to_string())
    }
}

/// Fallback messages shown when the server gives no reason
pub mod fallback {
    pub const FETCH_EVENTS: &str = "Failed to fetch events";
    pub const SEARCH_EVENTS: &str = "Failed to search events";
    pub const FETCH_EVENT: &str = "Failed to fetch event details";
    pub const CREATE_EVENT: &str = "Failed to create event. Please try again.";
    pub const UPDATE_EVENT: &str = "Failed to update event. Please try again.";
    pub const DELETE_EVENT: &str = "Failed to delete event";
    pub const ADD_ATTENDEE: &str = "Failed to add attendee";
    pub const SEND_REMINDER: &str = "Failed to send reminder";
    pub const LOGIN: &str = "Login failed. Please try again.";
    pub const SIGNUP: &str = "Signup failed. Please try again.";
    pub const PROFILE: &str = "Failed to load profile";
}
