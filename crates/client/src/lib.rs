//! Event Manager client
//!
//! Typed API calls, the on-disk session cache, and the page/form state
//! machines the `events` command drives.

pub mod api;
pub mod error;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

pub use api::{ApiClient, DEFAULT_SERVER};
pub use error::{ClientError, Result};
pub use routes::{nav_items, NavItem, Redirect, Route, REDIRECT_DELAY};
pub use session::{Session, SessionStore};
pub use state::{FormState, PageState};

/// Build an API client carrying the cached token, if any
pub fn connect(server: &str, store: &SessionStore) -> Result<ApiClient> {
    let token = store.load()?.map(|s| s.token);
    Ok(ApiClient::new(server)?.with_token(token))
}
