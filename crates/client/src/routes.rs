//! Client routes and navigation

use crate::session::Session;
use std::fmt;
use std::time::Duration;

/// Delay before a successful create/update returns to the home page
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    EventDetails(String),
    Create,
    Update(String),
    Login,
    Signup,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::EventDetails(id) => format!("/events/{}", id),
            Route::Create => "/create-event".to_string(),
            Route::Update(id) => format!("/update-event/{}", id),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Navigate to `to` once `after` has elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}

impl Redirect {
    pub fn now(to: Route) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub fn delayed(to: Route) -> Self {
        Self {
            to,
            after: REDIRECT_DELAY,
        }
    }

    pub async fn wait(&self) {
        if !self.after.is_zero() {
            tokio::time::sleep(self.after).await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavItem {
    Link { label: &'static str, route: Route },
    /// Signed-in user's menu (profile, logout)
    Account { name: String },
}

pub fn nav_items(session: Option<&Session>) -> Vec<NavItem> {
    let mut items = vec![NavItem::Link {
        label: "Home",
        route: Route::Home,
    }];

    match session {
        Some(session) => {
            items.push(NavItem::Link {
                label: "Create Event",
                route: Route::Create,
            });
            items.push(NavItem::Account {
                name: session.user.name.clone(),
            });
        }
        None => {
            items.push(NavItem::Link {
                label: "Login",
                route: Route::Login,
            });
            items.push(NavItem::Link {
                label: "Sign Up",
                route: Route::Signup,
            });
        }
    }

    items
}
