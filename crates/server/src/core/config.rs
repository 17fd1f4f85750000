//! Server configuration

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::auth::AuthManager;
use crate::events::EventService;
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};

/// Configuration for the Event Manager server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Data root (event documents, default user database)
    pub data_dir: PathBuf,
    /// SQLite connection string for the users table
    pub database_url: String,
    /// Allowed cross-origin client address; permissive when unset
    pub client_origin: Option<String>,
    /// Listening port
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: String,
    /// Token lifetime
    pub token_ttl: chrono::Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Notification gateway; reminders are only logged when unset
    pub notify_webhook_url: Option<String>,
    /// Timeout for one gateway call
    pub notify_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_base_dir(events_common::events_root())
    }
}

impl ServerConfig {
    /// Create config rooted at `base_dir` with built-in defaults
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let data_dir = base_dir.into();
        let database_url = sqlite_url(&events_common::users_db_path(&data_dir));

        Self {
            data_dir,
            database_url,
            client_origin: None,
            port: 5001,
            jwt_secret: format!(
                "{}{}",
                uuid::Uuid::new_v4().simple(),
                uuid::Uuid::new_v4().simple()
            ),
            token_ttl: chrono::Duration::hours(24),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            notify_webhook_url: None,
            notify_timeout: Duration::from_secs(10),
        }
    }

    /// Read configuration from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        config.client_origin = non_empty_var("CLIENT_ORIGIN");
        if let Some(port) = non_empty_var("PORT") {
            config.port = port.parse().context("PORT must be a port number")?;
        }
        match non_empty_var("JWT_SECRET") {
            Some(secret) => config.jwt_secret = secret,
            None => warn!("JWT_SECRET not set; tokens will not survive a restart"),
        }
        if let Some(hours) = non_empty_var("TOKEN_TTL_HOURS") {
            config.token_ttl = parse_token_ttl(&hours)?;
        }
        if let Some(cost) = non_empty_var("BCRYPT_COST") {
            config.bcrypt_cost = cost.parse().context("BCRYPT_COST must be a number")?;
        }
        config.notify_webhook_url = non_empty_var("NOTIFY_WEBHOOK_URL");

        Ok(config)
    }

    pub fn events_dir(&self) -> PathBuf {
        events_common::events_dir(&self.data_dir)
    }

    /// Ensure all directories exist
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        tokio::fs::create_dir_all(self.events_dir()).await?;
        Ok(())
    }

    fn notifier(&self) -> anyhow::Result<Arc<dyn Notifier>> {
        Ok(match &self.notify_webhook_url {
            Some(url) => {
                info!("Reminders go to webhook {}", url);
                Arc::new(WebhookNotifier::new(url.clone(), self.notify_timeout)?)
            }
            None => Arc::new(LogNotifier),
        })
    }
}

/// Longest accepted token lifetime (one year)
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Parse `TOKEN_TTL_HOURS`: a whole number of hours in `1..=MAX_TOKEN_TTL_HOURS`
fn parse_token_ttl(raw: &str) -> anyhow::Result<chrono::Duration> {
    let hours: i64 = raw
        .trim()
        .parse()
        .context("TOKEN_TTL_HOURS must be a whole number of hours")?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        anyhow::bail!(
            "TOKEN_TTL_HOURS must be between 1 and {}, got {}",
            MAX_TOKEN_TTL_HOURS,
            hours
        );
    }
    chrono::Duration::try_hours(hours).context("TOKEN_TTL_HOURS is out of range")
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn sqlite_url(path: &std::path::Path) -> String {
    format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"))
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub events: Arc<EventService>,
    pub auth: Arc<AuthManager>,
}

impl AppState {
    /// Build every service from `config`, picking the notifier it names
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let notifier = config.notifier()?;
        Self::with_notifier(config, notifier).await
    }

    pub async fn with_notifier(
        config: ServerConfig,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        config.ensure_dirs().await?;

        let events = Arc::new(EventService::new(&config.events_dir(), notifier).await?);
        info!("Event Service initialized");

        let auth = Arc::new(AuthManager::new(&config).await?);
        info!("Auth Manager initialized");

        Ok(Self {
            config,
            events,
            auth,
        })
    }
}
