//! Authentication Module
//!
//! Handles user signup, login, and token verification.
//! Users are stored in SQLite (`users` table, unique email); passwords are
//! bcrypt hashed; sessions are signed, expiring JWTs.

pub mod handlers;
pub mod middleware;

use crate::core::config::ServerConfig;
use crate::core::error::{Error, Result};
use anyhow::Context;
use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use events_common::{
    looks_like_email, normalize_email, AuthResponse, LoginRequest, SignupRequest, UserInfo,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

type UserRow = (String, String, String, String);

/// Auth manager handles all authentication
pub struct AuthManager {
    pool: SqlitePool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Connect to the users database and create the schema
    pub async fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("Invalid DATABASE_URL {}", config.database_url))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to open users database")?;

        let manager = Self {
            pool,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: config.token_ttl,
            bcrypt_cost: config.bcrypt_cost,
        };

        manager.init_db().await?;

        info!("[Auth] Initialized at {}", config.database_url);

        Ok(manager)
    }

    async fn init_db(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Register a new user and issue a token
    pub async fn signup(&self, req: SignupRequest) -> Result<AuthResponse> {
        let name = req.name.as_deref().map(str::trim).unwrap_or_default();
        let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
        let password = req.password.unwrap_or_default();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Name, email and password are required".to_string(),
            ));
        }
        if !looks_like_email(&email) {
            return Err(Error::Validation(format!("Invalid email address: {}", email)));
        }

        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(email_taken());
        }

        let password_hash = hash(&password, self.bcrypt_cost)?;
        let user = UserInfo {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&password_hash)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            // Lost a race with a concurrent signup for the same address
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(email_taken())
            }
            Err(e) => return Err(e.into()),
        }

        info!("[Auth] User registered: {} ({})", user.name, user.email);

        let token = self.issue_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    /// Check credentials and issue a token
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
        let password = req.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let row: Option<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, email, name, password_hash, created_at)) = row else {
            warn!("[Auth] Login for unknown email {}", email);
            return Err(invalid_credentials());
        };

        if !verify(&password, &password_hash)? {
            warn!("[Auth] Failed login attempt for {}", email);
            return Err(invalid_credentials());
        }

        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(&id)
            .execute(&self.pool)
            .await?;

        let user = user_info((id, email, name, created_at))?;
        info!("[Auth] User logged in: {}", user.email);

        let token = self.issue_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    pub fn issue_token(&self, user: &UserInfo) -> Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| Error::Internal("Token lifetime overflows the calendar".to_string()))?;
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| Error::Unauthorized(format!("Invalid or expired token: {}", e)))
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: &str) -> Result<UserInfo> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, name, created_at FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let row = row.ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))?;
        user_info(row)
    }
}

fn user_info((id, email, name, created_at): UserRow) -> Result<UserInfo> {
    let created_at = created_at.parse::<DateTime<Utc>>().map_err(|e| {
        Error::Internal(format!(
            "Stored created_at {:?} for user {} is unreadable: {}",
            created_at, id, e
        ))
    })?;

    Ok(UserInfo {
        id,
        name,
        email,
        created_at,
    })
}

fn email_taken() -> Error {
    Error::Conflict("Email already registered".to_string())
}

fn invalid_credentials() -> Error {
    Error::Unauthorized("Invalid email or password".to_string())
}
