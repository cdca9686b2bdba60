use std::{fmt, str::FromStr};

use anyhow::Context;
use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

// Keeps the signing secret out of logs and panic messages.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Argon2id work factor.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 1,
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub statement_timeout_ms: u64,
}

// The URL usually carries credentials.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("statement_timeout_ms", &self.statement_timeout_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; missing or unparseable
    /// optional values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PasswordConfig::default();

        let secret = lookup("JWT_SECRET").context("JWT_SECRET is not set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").context("DATABASE_URL is not set")?,
            max_connections: parse_or(lookup("DATABASE_MAX_CONNECTIONS"), 10),
            connect_timeout_secs: parse_or(lookup("DATABASE_CONNECT_TIMEOUT_SECS"), 10),
            statement_timeout_ms: parse_or(lookup("DATABASE_STATEMENT_TIMEOUT_MS"), 5_000),
        };
        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "taskkeeper".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "taskkeeper-users".into()),
            ttl_minutes: parse_or(lookup("JWT_TTL_MINUTES"), 60 * 24),
        };
        anyhow::ensure!(
            (1..=MAX_TTL_MINUTES).contains(&jwt.ttl_minutes),
            "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}"
        );
        let password = PasswordConfig {
            memory_kib: parse_or(lookup("PASSWORD_MEMORY_KIB"), defaults.memory_kib),
            iterations: parse_or(lookup("PASSWORD_ITERATIONS"), defaults.iterations),
            parallelism: parse_or(lookup("PASSWORD_PARALLELISM"), defaults.parallelism),
        };

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(lookup("APP_PORT"), 8080),
            database,
            jwt,
            password,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// One year.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
