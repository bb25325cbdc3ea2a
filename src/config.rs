use std::{fmt, time::Duration};

use anyhow::Context;
use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Administrator record created on first start when no account holds `email`.
#[derive(Clone, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub store_timeout_ms: u64,
    pub jwt: JwtConfig,
    pub admin: AdminSeed,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "student-auth".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "student-auth-clients".into()),
            ttl_hours: check_ttl_hours(parse_or("JWT_TTL_HOURS", 168))?,
        };

        let admin = AdminSeed {
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@iset.tn".into()),
            name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrateur".into()),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into()),
        };

        let port = std::env::var("APP_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3002);

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", 5_000),
            jwt,
            admin,
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

pub const MAX_TTL_HOURS: i64 = 87_600;

fn check_ttl_hours(hours: i64) -> anyhow::Result<i64> {
    anyhow::ensure!(
        (1..=MAX_TTL_HOURS).contains(&hours),
        "JWT_TTL_HOURS must be between 1 and {MAX_TTL_HOURS}, got {hours}"
    );
    Ok(hours)
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
