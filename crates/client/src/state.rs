//! Page and form state machines

use crate::error::Result;

/// Lifecycle of a page that fetches data
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Loading,
    Ready(T),
    Error(String),
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        PageState::Loading
    }
}

impl<T> PageState<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => PageState::Ready(value),
            Err(e) => PageState::Error(e.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PageState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PageState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Lifecycle of a form submission
///
/// `begin` is refused while a submission is in flight, so a double click
/// cannot send twice. `succeed` and `fail` only apply to a submission in
/// flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Success(String),
    Error(String),
}

impl FormState {
    /// Enter `Submitting`; returns false if already submitting
    pub fn begin(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        *self = FormState::Submitting;
        true
    }

    pub fn succeed(&mut self, message: impl Into<String>) -> bool {
        self.finish(FormState::Success(message.into()))
    }

    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        self.finish(FormState::Error(message.into()))
    }

    fn finish(&mut self, next: FormState) -> bool {
        if !self.is_submitting() {
            return false;
        }
        *self = next;
        true
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, FormState::Submitting)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            FormState::Success(message) | FormState::Error(message) => Some(message),
            _ => None,
        }
    }
}
