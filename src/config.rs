use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

const DEV_ORIGIN: &str = "http://localhost:3001";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// `None` keeps tokens valid forever.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub name: String,
    /// Require TLS but skip certificate verification.
    pub relaxed_tls: bool,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dev_mode: bool,
    pub allowed_origins: Vec<String>,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub owner_scoped_mutations: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let required =
            |key: &str| get(key).with_context(|| format!("missing environment variable {key}"));
        let flag = |key: &str| {
            get(key)
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(false)
        };

        let dev_mode = get("IS_DEV_MODE").is_some();

        let allowed_origins = if dev_mode {
            vec![DEV_ORIGIN.to_string()]
        } else {
            vec![required("FRONT_DOMAIN")?]
        };

        let store = match get("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => anyhow::bail!("unknown STORE_BACKEND {other}"),
        };

        let url = get("DATABASE_URL");
        // Discrete connection settings are only mandatory when Postgres is used without a URL.
        let needs_parts = store == StoreBackend::Postgres && url.is_none();
        let part = |key: &str| -> anyhow::Result<String> {
            if needs_parts {
                required(key)
            } else {
                Ok(get(key).unwrap_or_default())
            }
        };
        let database = DatabaseConfig {
            url,
            host: part("DB_HOST")?,
            user: part("DB_USER")?,
            password: get("DB_PASSWORD").unwrap_or_default(),
            port: parse_or(get("DB_PORT"), 5432, "DB_PORT")?,
            name: part("DB_NAME")?,
            relaxed_tls: !dev_mode,
            max_connections: parse_or(get("DB_MAX_CONNECTIONS"), 10, "DB_MAX_CONNECTIONS")?,
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET_KEY")?,
            ttl_minutes: get("JWT_TTL_MINUTES")
                .map(|v| v.parse::<i64>().context("JWT_TTL_MINUTES must be an integer"))
                .transpose()?,
        };

        let port = parse_or(get("APP_PORT").or_else(|| get("PORT")), 3000, "APP_PORT")?;

        Ok(Self {
            dev_mode,
            allowed_origins,
            database,
            jwt,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            store,
            owner_scoped_mutations: flag("OWNER_SCOPED_MUTATIONS"),
        })
    }
}

fn parse_or<T>(value: Option<String>, default: T, key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v.parse().with_context(|| format!("invalid {key}")),
        None => Ok(default),
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        let options = match &self.url {
            Some(url) => PgConnectOptions::from_str(url).context("parse DATABASE_URL")?,
            None => PgConnectOptions::new()
                .host(&self.host)
                .username(&self.user)
                .password(&self.password)
                .port(self.port)
                .database(&self.name),
        };
        let ssl = if self.relaxed_tls {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        Ok(options.ssl_mode(ssl))
    }
}

impl JwtConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_minutes
            .filter(|m| *m > 0)
            .map(|m| Duration::from_secs(m as u64 * 60))
    }
}
